//! A check run over one document.

use std::path::{Path, PathBuf};

use crate::config::{Config, Profile};
use crate::control::ControlTree;
use crate::error::Result;
use crate::model::Document;
use crate::parser::{ParseOptions, PdfParser};
use crate::report::{Outcome, Report};
use crate::rules::{Applicability, RuleContext, RuleId, RuleRegistry, Target};

/// Inputs of a check run.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// The PDF to check
    pub pdf: PathBuf,
    /// Build log with control directives
    pub log: Option<PathBuf>,
    /// YAML configuration
    pub config: PathBuf,
    /// Document type, a top-level key of the configuration
    pub document_type: String,
    /// Draft build
    pub draft: bool,
    /// PDF parsing options
    pub parse: ParseOptions,
}

impl SessionOptions {
    pub fn new(
        pdf: impl Into<PathBuf>,
        config: impl Into<PathBuf>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            pdf: pdf.into(),
            log: None,
            config: config.into(),
            document_type: document_type.into(),
            draft: false,
            parse: ParseOptions::default(),
        }
    }

    pub fn with_log(mut self, log: impl Into<PathBuf>) -> Self {
        self.log = Some(log.into());
        self
    }

    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }
}

/// Loaded inputs, read once and shared by every rule.
#[derive(Debug)]
pub struct Session {
    document: Document,
    control: ControlTree,
    config: Config,
    document_type: String,
    target: Target,
}

impl Session {
    /// Load the PDF, the log and the configuration.
    ///
    /// Fails when any input cannot be read or the configuration has no
    /// profile for the document type.
    pub fn open(options: SessionOptions) -> Result<Self> {
        let config = Config::from_path(&options.config)?;
        config.profile(&options.document_type)?;

        let control = match &options.log {
            Some(path) => ControlTree::from_path(path)?,
            None => ControlTree::new(),
        };

        let document = parse_pdf(&options.pdf, options.parse)?;

        Self::from_parts(document, control, config, &options.document_type, options.draft)
    }

    /// Assemble a session from inputs loaded elsewhere.
    pub fn from_parts(
        document: Document,
        control: ControlTree,
        config: Config,
        document_type: &str,
        draft: bool,
    ) -> Result<Self> {
        config.profile(document_type)?;
        let target = Target::new(document_type, draft);
        log::info!(
            "Session for {} ({:?}{}), {} pages",
            document_type,
            target.kind,
            if draft { ", draft" } else { "" },
            document.page_count()
        );

        Ok(Self {
            document,
            control,
            config,
            document_type: document_type.to_string(),
            target,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn control(&self) -> &ControlTree {
        &self.control
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn profile(&self) -> Result<&Profile> {
        self.config.profile(&self.document_type)
    }

    /// Run the selected rules, or every registered rule when `selection` is
    /// empty.
    ///
    /// Rules run independently; rules the target's applicability excludes
    /// are reported as skipped.
    pub fn run(&self, registry: &RuleRegistry, selection: &[RuleId]) -> Result<Report> {
        let profile = self.profile()?;
        let applicability = Applicability::for_target(self.target);
        let ctx = RuleContext {
            document: &self.document,
            profile,
            control: &self.control,
            target: self.target,
        };

        let mut report = Report::new(&self.document_type, self.target, self.document.page_count());

        for id in RuleId::ALL {
            if !selection.is_empty() && !selection.contains(&id) {
                continue;
            }
            let Some(rule) = registry.get(id) else {
                if !selection.is_empty() {
                    report.push(
                        id,
                        Outcome::Skipped {
                            reason: "rule is not registered".to_string(),
                        },
                    );
                }
                continue;
            };

            let outcome = match applicability.excluded_by(id) {
                Some(gate) => Outcome::Skipped {
                    reason: gate.to_string(),
                },
                None => match rule.check(&ctx) {
                    Ok(()) => Outcome::Passed,
                    Err(violation) => Outcome::Failed {
                        message: violation.to_string(),
                    },
                },
            };
            log::debug!("{}: {:?}", id, outcome);
            report.push(id, outcome);
        }

        log::info!(
            "{} passed, {} failed, {} skipped",
            report.passed_count(),
            report.failed_count(),
            report.skipped_count()
        );
        Ok(report)
    }
}

fn parse_pdf(path: &Path, options: ParseOptions) -> Result<Document> {
    PdfParser::open_with_options(path, options)?.parse()
}
