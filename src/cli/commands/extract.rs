use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::super::args::ExtractArgs;
use super::super::exit_status::ExitStatus;
use super::super::report::{ExtractCounts, print_extracted_to, print_note, print_scan_warnings};
use crate::config::{Config, load_config};
use crate::core::pipeline::Extraction;
use crate::core::pot::{HeaderFields, PotWriter, read_version};
use crate::core::scanner::{
    FileFilter, PythonScanner, TemplateScanner, ZcmlScanner, python::TOOL_FILES,
};

/// Settings for one run: config file values with command line overrides applied.
#[derive(Debug)]
struct ExtractPlan {
    config: Config,
    source_root: PathBuf,
    base_dir: Option<PathBuf>,
    output: PathBuf,
    header: Option<PathBuf>,
}

impl ExtractPlan {
    fn resolve(args: ExtractArgs, mut config: Config) -> Result<Self> {
        if let Some(domain) = args.domain {
            config.domain = domain;
        }
        config.excludes.extend(args.excludes);
        config.python_only |= args.python_only;
        if args.exclude_default_domain {
            config.include_default_domain = false;
        }
        config.validate()?;

        let source_root = args
            .path
            .unwrap_or_else(|| PathBuf::from(&config.source_root));
        let base_dir = args.base_dir.or_else(|| config.base_dir.as_ref().map(PathBuf::from));
        let output = args.output.unwrap_or_else(|| config.output_path());
        let header = args
            .header
            .or_else(|| config.header_template.as_ref().map(PathBuf::from));

        Ok(Self {
            config,
            source_root,
            base_dir,
            output,
            header,
        })
    }

    fn extraction(&self) -> Result<Extraction> {
        let config = &self.config;

        let python_filter = FileFilter::new([&config.python_pattern])?
            .exclude(TOOL_FILES)?
            .exclude(&config.excludes)?;
        let mut extraction = Extraction::new(&self.source_root)
            .with_filtered_scanner(
            PythonScanner::new().with_keywords(config.python_keywords.clone()),
            python_filter,
        );

        if !config.python_only {
            let template_filter =
                FileFilter::new(&config.template_patterns)?.exclude(&config.excludes)?;
            let zcml_filter = FileFilter::new([&config.zcml_pattern])?.exclude(&config.excludes)?;
            extraction = extraction
                .with_filtered_scanner(
                    TemplateScanner::new(&config.domain)
                        .include_default_domain(config.include_default_domain),
                    template_filter,
                )
                .with_filtered_scanner(
                    ZcmlScanner::new(&config.domain).with_attributes(config.zcml_attributes.clone()),
                    zcml_filter,
                );
        }

        if let Some(base_dir) = &self.base_dir {
            extraction = extraction.with_base_dir(base_dir);
        }
        Ok(extraction)
    }

    fn writer(&self) -> Result<PotWriter> {
        let fields = HeaderFields::new(&self.config.project_name, read_version(&self.source_root));
        let mut writer = PotWriter::new(fields).escape_non_ascii(self.config.escape_non_ascii);
        if let Some(header) = &self.header {
            let template = fs::read_to_string(header)
                .with_context(|| format!("Failed to read header template: {:?}", header))?;
            writer = writer.with_header_template(template);
        }
        Ok(writer)
    }
}

fn print_plan<W: Write>(
    plan: &ExtractPlan,
    extraction: &Extraction,
    config_path: Option<&Path>,
    writer: &mut W,
) {
    match config_path {
        Some(path) => print_note(&format!("using config {}", path.display()), writer),
        None => print_note("no config file found, using defaults", writer),
    }
    let kinds: Vec<String> = extraction.kinds().iter().map(|k| k.to_string()).collect();
    print_note(
        &format!(
            "domain \"{}\", scanning {} ({})",
            plan.config.domain,
            extraction.source_root().display(),
            kinds.join(", ")
        ),
        writer,
    );
    if !plan.config.excludes.is_empty() {
        print_note(&format!("excluding {}", plan.config.excludes.join(", ")), writer);
    }
}

pub fn extract(args: ExtractArgs) -> Result<ExitStatus> {
    let verbose = args.verbose;
    let start_dir = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let loaded = load_config(&start_dir)?;
    let plan = ExtractPlan::resolve(args, loaded.config)?;

    let extraction = plan.extraction()?;
    if verbose {
        print_plan(&plan, &extraction, loaded.path.as_deref(), &mut io::stderr().lock());
    }

    let outcome = extraction.run()?;
    print_scan_warnings(&outcome.warnings, verbose);

    plan.writer()?.write_file(&outcome.catalog, &plan.output)?;

    let counts = ExtractCounts {
        messages: outcome.catalog.len(),
        locations: outcome.catalog.location_count(),
        files: outcome.files_scanned,
    };
    // Keep stdout clean when the POT itself goes there.
    if plan.output.as_os_str() == "-" {
        print_extracted_to(counts, &plan.output, &mut io::stderr().lock());
    } else {
        print_extracted_to(counts, &plan.output, &mut io::stdout().lock());
    }

    Ok(ExitStatus::Success)
}
