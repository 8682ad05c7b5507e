use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Generate Stash config files from VLESS link lists", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "Generator config, accept file path or URL")]
    pub generator: Option<String>,

    #[arg(short, long, help = "Link list URL or file path, overrides the generator config")]
    pub source: Option<String>,

    #[arg(short, long, help = "Emit debug log")]
    pub verbose: bool,

    #[arg(short, long, help = "Config output path")]
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["stashgen"]).unwrap();
        assert!(args.generator.is_none());
        assert!(args.source.is_none());
        assert!(args.output.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "stashgen",
            "-g",
            "~/stashgen.toml",
            "-s",
            "./list.txt",
            "-o",
            "./out.yaml",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.generator.as_deref(), Some("~/stashgen.toml"));
        assert_eq!(args.source.as_deref(), Some("./list.txt"));
        assert_eq!(args.output.as_deref(), Some("./out.yaml"));
        assert!(args.verbose);
    }
}
