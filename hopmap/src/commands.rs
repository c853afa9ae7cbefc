use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("hopmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("hopmap")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("map")
                .about(
                    "Extract hop addresses from an HTML document, resolve them to \
                coordinates and render a map.",
                )
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(true)
                        .help("HTML document containing the hop table")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save output to file (default: print to stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: html, json, text")
                        .value_parser(["html", "map", "json", "text"])
                        .default_value("html"),
                )
                .arg(
                    arg!(--"no-path")
                        .required(false)
                        .help("Do not draw the connecting path between hops")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"from-embedded")
                        .required(false)
                        .help(
                            "Render from the document's embedded data-locations payload \
                        instead of running lookups",
                        )
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"endpoint" <URL>)
                        .required(false)
                        .help("Geolocation lookup endpoint (default: https://ipapi.co)")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Lookup request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"skip-private")
                        .required(false)
                        .help("Skip lookups for private, loopback and link-local addresses")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"dedup")
                        .required(false)
                        .help("Resolve each distinct address once (default: keep duplicates)")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("extract")
                .about("Extract hop addresses from an HTML document without resolving them.")
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(true)
                        .help("HTML document containing the hop table")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"raw")
                        .required(false)
                        .help("Sweep the whole input as free text instead of the hop table")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("resolve")
                .about("Resolve a list of addresses to coordinates.")
                .arg(
                    arg!([ADDRESS])
                        .required(false)
                        .num_args(0..)
                        .help("Addresses to resolve"),
                )
                .arg(
                    arg!(-a --"addresses-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of addresses to resolve")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save output to file (default: print to stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: json, text")
                        .value_parser(["json", "text"])
                        .default_value("json"),
                )
                .arg(
                    arg!(--"endpoint" <URL>)
                        .required(false)
                        .help("Geolocation lookup endpoint (default: https://ipapi.co)")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Lookup request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"skip-private")
                        .required(false)
                        .help("Skip lookups for private, loopback and link-local addresses")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"dedup")
                        .required(false)
                        .help("Resolve each distinct address once")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
