use std::fs;

const DEFAULT_CONFIG: &str = "src/default_config.toml";

fn main() {
    println!("cargo:rerun-if-changed={DEFAULT_CONFIG}");

    // slackdown embeds this file with include_str!; a broken table would
    // silently fall back to Config::default() at runtime.
    let content = fs::read_to_string(DEFAULT_CONFIG)
        .unwrap_or_else(|e| panic!("cannot read {DEFAULT_CONFIG}: {e}"));
    if let Err(e) = content.parse::<toml::Table>() {
        panic!("{DEFAULT_CONFIG} is not valid TOML: {e}");
    }
}
