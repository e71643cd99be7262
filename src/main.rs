//! stylegen CLI
//!
//! Usage:
//!   stylegen [OPTIONS] --assets <FILE> [TEMPLATE]
//!
//! Options:
//!   -a, --assets <FILE>   Asset bundle (JSON)
//!   -c, --config <FILE>   Engine configuration (TOML)
//!   -o, --output <FILE>   Write output to a file instead of stdout
//!   --syntax              Show template syntax reference
//!   -h, --help            Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stylegen::{AssetBundle, Engine, EngineConfig};

#[derive(Parser)]
#[command(name = "stylegen")]
#[command(about = "Generate source code from design tokens")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    template: Option<PathBuf>,

    /// Asset bundle exported from the design tool (JSON)
    #[arg(short, long, required_unless_present = "syntax")]
    assets: Option<PathBuf>,

    /// Engine configuration with reserved identifiers (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show template syntax reference
    #[arg(long)]
    syntax: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stylegen=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.syntax {
        print_syntax();
        return;
    }

    let Some(assets_path) = &cli.assets else {
        fail("no asset bundle given (use --assets)");
    };
    let bundle = AssetBundle::from_file(assets_path).unwrap_or_else(|e| {
        fail(&format!("Error loading assets '{}': {}", assets_path.display(), e))
    });

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path).unwrap_or_else(|e| {
            fail(&format!("Error loading config '{}': {}", path.display(), e))
        }),
        None => EngineConfig::default(),
    };

    let (source, filename) = match &cli.template {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => fail(&format!("Error reading template '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                fail(&format!("Error reading from stdin: {}", e));
            }
            (buffer, "<stdin>".to_string())
        }
    };

    tracing::info!(template = %filename, "Rendering");
    let output = match Engine::new(&bundle, &config).parse(&source) {
        Ok(output) => output,
        Err(e) => {
            eprint!("{}", e.format(&source, &filename));
            process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, output) {
                fail(&format!("Error writing '{}': {}", path.display(), e));
            }
        }
        None => print!("{}", output),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn print_syntax() {
    println!(
        r#"STYLEGEN TEMPLATE SYNTAX
========================

TOKENS
------
{{{{%<path>%}}}}                       Insert a value of the bound asset
{{{{%<path>|<fn>|<fn>%}}}}             Pipe the value through transformations

LOOPS
-----
{{{{% FOR color %}}}}                  Repeat for each color, sorted by name
...
{{{{% END color %}}}}

{{{{% FOR textStyle %}}}}              Repeat for each text style, sorted by name
...
{{{{% END textStyle %}}}}

Only colors and text styles can be looped over, so spacing.* tokens
always fail with an unknown token error.

CONDITIONALS
------------
{{{{% IF textStyle.alignment %}}}}     Keep the body when the value is present
...
{{{{% ENDIF %}}}}

a{{{{% IF textStyle.lineheight %}}}}b{{{{% ENDIF %}}}}c    Inline form; the whole line is
                                         dropped when the value is absent,
                                         even with other blocks on the line

COLOR PATHS
-----------
color.r, color.g, color.b     Components 0-255
color.a                       Alpha 0-1
color.rgb                     #rrggbb
color.argb                    #aarrggbb
color.identity[.camelcase|.snakecase|.kebabcase|.pascalcase]

TEXT STYLE PATHS
----------------
textStyle.fontname / font     PostScript name
textStyle.fontfamily
textStyle.fontsize, fontweight, fontstyle, fontstretch
textStyle.alignment, lineheight, linespacing, letterspacing   (optional)
textStyle.identity[.<casing>]
textStyle.color.<color path>  Color with the style's exact RGBA value

TRANSFORMATIONS
---------------
lowercase
uppercase
replace(from, to)             Arguments may be "quoted""#
    );
}
