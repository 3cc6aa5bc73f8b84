use std::{io, path::Path};

use anyhow::Result;
use colored::Colorize;

use super::super::args::LocalesArgs;
use super::super::exit_status::ExitStatus;
use super::super::report::{print_locales_summary_to, print_locales_to, print_note};
use crate::config::load_config;
use crate::locales::{LocaleSettings, discover};

pub fn locales(args: LocalesArgs) -> Result<ExitStatus> {
    let domain = match args.domain {
        Some(domain) => domain,
        None => load_config(Path::new("."))?.config.domain,
    };
    let settings = LocaleSettings::new(args.compile_mo, args.allowed_languages.as_deref());

    if args.verbose {
        let mut stderr = io::stderr().lock();
        print_note(&format!("compile mo files: {}", settings.compile_mo), &mut stderr);
        match &settings.allowed_languages {
            Some(languages) => {
                let languages: Vec<_> = languages.iter().map(String::as_str).collect();
                print_note(&format!("allowed languages: {}", languages.join(", ")), &mut stderr);
            }
            None => print_note("allowed languages: all", &mut stderr),
        }
    }

    let catalogs = discover(&args.dir, &domain, &settings)?;
    if catalogs.is_empty() {
        eprintln!(
            "{} no catalogs for domain \"{}\" in {}",
            "warning:".bold().yellow(),
            domain,
            args.dir.display()
        );
        return Ok(ExitStatus::Success);
    }

    print_locales_to(
        &catalogs,
        settings.compile_mo,
        args.verbose,
        &mut io::stdout().lock(),
    );

    let pending = if settings.compile_mo {
        catalogs
            .iter()
            .filter(|c| c.mo_status.needs_compile())
            .count()
    } else {
        0
    };

    if pending > 0 {
        print_locales_summary_to(catalogs.len(), pending, &mut io::stderr().lock());
        Ok(ExitStatus::Failure)
    } else {
        print_locales_summary_to(catalogs.len(), pending, &mut io::stdout().lock());
        Ok(ExitStatus::Success)
    }
}
