use clap::{Args, Parser, Subcommand};
use planillas::cli;
use planillas::config::AppConfig;
use planillas::error::PlanillaResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "planillas")]
#[command(about = "Generate community delivery and attendance forms from roster spreadsheets")]
#[command(long_about = "Planillas - roster spreadsheets in, printable forms out

Joins a community roster with a beneficiary roster, splits each community's
beneficiaries into pages of 10 and stamps them onto the form template.

COMMANDS:
  communities - List the communities of a community roster
  roster      - Show the matched beneficiaries and pages of one community
  generate    - Fill a form for one community (or --all) as .xlsx/.pdf
  variants    - List the available form variants
  convert     - Convert a legacy .xls workbook to .xlsx

EXAMPLES:
  planillas communities Comunidades.xlsx
  planillas roster Comunidades.xlsx Beneficiarios.xlsx \"Aldea X\"
  planillas generate Comunidades.xlsx -b Beneficiarios.xlsx -c \"Aldea X\" --pdf
  planillas generate Comunidades.xlsx -b Beneficiarios.xlsx --all -f asistencia
  planillas generate Comunidades.xlsx -b Beneficiarios.xlsx --all --pdf --zip

CONFIGURATION:
  Settings are read from planillas.yaml in the working directory, or from the
  file given with --config (PLANILLAS_CONFIG). Flags override the file.")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true, env = "PLANILLAS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Issuing office overrides
#[derive(Args, Debug)]
struct OfficeArgs {
    /// Executing unit (DAPA, DAU, DADA...)
    #[arg(long, env = "PLANILLAS_UNIT")]
    unit: Option<String>,

    /// Office letter number
    #[arg(long, env = "PLANILLAS_NUMBER")]
    number: Option<String>,

    /// Office letter year
    #[arg(long, env = "PLANILLAS_YEAR")]
    year: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the communities of a community roster
    Communities {
        /// Community roster (.xlsx, .xls or .ods)
        file: PathBuf,
    },

    /// Show the beneficiaries and pages for one community
    Roster {
        /// Community roster
        communities: PathBuf,

        /// Beneficiary roster
        beneficiaries: PathBuf,

        /// Community / establishment name
        community: String,

        /// Form variant
        #[arg(short = 'f', long = "form", default_value = "planilla")]
        variant: String,

        #[command(flatten)]
        office: OfficeArgs,
    },

    #[command(long_about = "Fill a form variant for one community.

Roster forms get one worksheet per page of 10 beneficiaries; additional forms
are a single sheet without beneficiaries and do not need a beneficiary roster.
A community with no beneficiaries produces no roster form.

Output goes to <output-dir>/Planillas_<department>_<office code>/.
With --pdf every workbook is also exported through a headless office suite.
With --all --zip the batch is also packed into
<output-dir>/planillas_comunidades.zip.")]
    /// Fill a form for one community, or for all of them
    Generate {
        /// Community roster
        communities: PathBuf,

        /// Beneficiary roster (required for roster forms)
        #[arg(short, long)]
        beneficiaries: Option<PathBuf>,

        /// Community / establishment name
        #[arg(short, long, required_unless_present = "all")]
        community: Option<String>,

        /// Generate for every community in the roster
        #[arg(long, conflicts_with = "community")]
        all: bool,

        /// Form variant
        #[arg(short = 'f', long = "form", default_value = "planilla")]
        variant: String,

        /// Also export PDF
        #[arg(long)]
        pdf: bool,

        /// Pack every generated document into planillas_comunidades.zip
        #[arg(long, requires = "all")]
        zip: bool,

        /// Template workbook
        #[arg(short, long, env = "PLANILLAS_TEMPLATE")]
        template: Option<PathBuf>,

        /// Output root folder
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        office: OfficeArgs,
    },

    /// List the available form variants
    Variants,

    /// Convert a legacy .xls workbook to .xlsx
    Convert {
        /// Input workbook
        input: PathBuf,

        /// Output .xlsx (defaults to the input name with .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn apply_office(config: &mut AppConfig, office: OfficeArgs) {
    if let Some(unit) = office.unit {
        config.office.unit = unit;
    }
    if let Some(number) = office.number {
        config.office.number = number;
    }
    if let Some(year) = office.year {
        config.office.year = year;
    }
}

fn main() -> PlanillaResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planillas=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Communities { file } => cli::communities(file),

        Commands::Roster {
            communities,
            beneficiaries,
            community,
            variant,
            office,
        } => {
            apply_office(&mut config, office);
            config.validate()?;
            cli::roster(config, communities, beneficiaries, community, variant)
        }

        Commands::Generate {
            communities,
            beneficiaries,
            community,
            all,
            variant,
            pdf,
            zip,
            template,
            output_dir,
            office,
        } => {
            apply_office(&mut config, office);
            if let Some(template) = template {
                config.template = template;
            }
            if let Some(output_dir) = output_dir {
                config.output_root = output_dir;
            }
            config.validate()?;
            cli::generate(
                config,
                cli::GenerateArgs {
                    communities,
                    beneficiaries,
                    community,
                    variant,
                    all,
                    pdf,
                    zip,
                },
            )
        }

        Commands::Variants => cli::variants(config),

        Commands::Convert { input, output } => cli::convert(input, output),
    }
}
