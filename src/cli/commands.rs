use crate::config::AppConfig;
use crate::core::{community_index, selectable_communities, GenerationRequest};
use crate::error::PlanillaResult;
use crate::excel::{ExcelImporter, WorkbookConverter};
use crate::generator::{GenerationOutcome, Generator};
use crate::pdf::OfficeConverter;
use crate::types::Slot;
use colored::Colorize;
use std::path::PathBuf;

/// Inputs of the generate command.
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub communities: PathBuf,
    pub beneficiaries: Option<PathBuf>,
    pub community: Option<String>,
    pub variant: String,
    pub all: bool,
    pub pdf: bool,
    /// Pack the batch output into one archive (with `all`).
    pub zip: bool,
}

/// Execute the communities command
pub fn communities(file: PathBuf) -> PlanillaResult<()> {
    println!("{}", "📋 Planillas - Communities".bold().green());
    println!("   File: {}\n", file.display());

    let table = ExcelImporter::new(&file).import_communities()?;
    let names = selectable_communities(&table.records);

    if names.is_empty() {
        println!("{}", "⚠️  No communities found".yellow());
        return Ok(());
    }

    for name in &names {
        let index = community_index(&table.records, name);
        let record = table
            .records
            .iter()
            .find(|r| r.establishment_name.trim() == name);
        let place = record
            .map(|r| format!("{}, {}", r.department, r.municipality))
            .unwrap_or_default();
        println!(
            "   {:>3}  {}  {}",
            index.position,
            name.bright_blue().bold(),
            place.dimmed()
        );
    }

    println!("\n   {} communities", names.len());
    Ok(())
}

/// Execute the roster command
pub fn roster(
    config: AppConfig,
    communities: PathBuf,
    beneficiaries: PathBuf,
    community: String,
    variant: String,
) -> PlanillaResult<()> {
    println!("{}", "📋 Planillas - Roster".bold().green());
    println!("   Community: {}", community.bright_blue().bold());
    println!("   Form:      {}\n", variant);

    let generator = Generator::new(config)?;
    let community_table = ExcelImporter::new(&communities).import_communities()?;
    let beneficiary_table = ExcelImporter::new(&beneficiaries).import_beneficiaries()?;

    let request = GenerationRequest::new(community, variant);
    let plan = generator.plan(&community_table, Some(&beneficiary_table), &request)?;

    println!("   Code: {}", plan.labels.composite_code.bright_yellow());
    println!(
        "   {} beneficiaries, {} pages\n",
        plan.beneficiary_count(),
        plan.pages.len()
    );

    for page in &plan.pages {
        println!("   {}", format!("Page {}", page.index + 1).cyan().bold());
        for (i, slot) in page.slots.iter().enumerate() {
            match slot {
                Slot::Filled(b) => println!("   {:>4}  {:<50} {}", i + 1, b.full_name, b.identifier),
                Slot::Empty => println!("   {:>4}  {}", i + 1, "-".dimmed()),
            }
        }
        println!();
    }

    if plan.is_empty_roster() {
        println!("{}", "ℹ️  No beneficiaries for this community".yellow());
    }
    Ok(())
}

/// Execute the generate command
pub fn generate(config: AppConfig, args: GenerateArgs) -> PlanillaResult<()> {
    println!("{}", "📝 Planillas - Generate".bold().green());
    println!("   Form:     {}", args.variant);
    println!("   Template: {}", config.template.display());
    println!("   Office:   {}\n", config.office.office_code().bright_yellow());

    let office_program = config.office_program.clone();
    let mut generator = Generator::new(config)?;
    if args.pdf {
        generator = generator.with_pdf(Box::new(OfficeConverter::new(office_program)));
    }

    let community_table = ExcelImporter::new(&args.communities).import_communities()?;
    let beneficiary_table = match &args.beneficiaries {
        Some(path) => Some(ExcelImporter::new(path).import_beneficiaries()?),
        None => None,
    };

    if args.all {
        let report =
            generator.generate_all(&community_table, beneficiary_table.as_ref(), &args.variant)?;
        for form in report.generated() {
            print_generated(&form.xlsx, form.pdf.as_ref(), form.pages);
        }
        for (community, error) in &report.failures {
            println!("   {} {}: {}", "❌".red(), community.bold(), error);
        }
        println!(
            "\n{} {} generated, {} without beneficiaries, {} failed",
            "✅".green(),
            report.generated().count(),
            report.skipped(),
            report.failures.len()
        );
        if args.zip {
            let archive = report.package(&generator.config().output_root)?;
            println!("   🗜️  {}", archive.display());
        }
        return Ok(());
    }

    let community = args.community.unwrap_or_default();
    let request = GenerationRequest::new(community, args.variant);
    match generator.generate(&community_table, beneficiary_table.as_ref(), &request)? {
        GenerationOutcome::Generated(form) => {
            print_generated(&form.xlsx, form.pdf.as_ref(), form.pages);
            println!("\n{}", "✅ Generation Complete!".bold().green());
            println!("   Code: {}", form.composite_code);
        }
        GenerationOutcome::NothingToGenerate { community, .. } => {
            println!(
                "{} No beneficiaries for {}, nothing generated",
                "ℹ️ ".yellow(),
                community.bold()
            );
        }
    }
    Ok(())
}

fn print_generated(xlsx: &std::path::Path, pdf: Option<&PathBuf>, pages: usize) {
    println!("   📊 {} ({} sheets)", xlsx.display(), pages.max(1));
    if let Some(pdf) = pdf {
        println!("   📄 {}", pdf.display());
    }
}

/// Execute the variants command
pub fn variants(config: AppConfig) -> PlanillaResult<()> {
    println!("{}", "📋 Planillas - Form variants".bold().green());
    println!();

    let catalog = config.catalog()?;
    for variant in catalog.iter() {
        let kind = if variant.is_roster() {
            "roster".cyan()
        } else {
            "additional".magenta()
        };
        println!(
            "   {:<26} {:<11} {:<16} {}",
            variant.id.bold(),
            kind,
            variant.sheet,
            variant.title
        );
    }
    println!();
    Ok(())
}

/// Execute the convert command
pub fn convert(input: PathBuf, output: Option<PathBuf>) -> PlanillaResult<()> {
    println!("{}", "🔄 Planillas - Convert".bold().green());

    let converter = WorkbookConverter::new(&input);
    let output = output.unwrap_or_else(|| converter.default_output());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    let cells = converter.convert(&output)?;

    println!("{}", "✅ Conversion Complete!".bold().green());
    println!("   {} cells written\n", cells);
    Ok(())
}
