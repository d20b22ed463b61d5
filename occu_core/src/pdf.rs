//! # PDF Generation Module
//!
//! Generates occupant load reports using Typst.
//!
//! ## Architecture
//!
//! - Typst templates are embedded as string constants
//! - User text is injected as Typst string literals, never as raw markup
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! Two reports are available:
//!
//! - **Summary**: one line per occupancy type, then the grand total
//! - **Detailed**: every row in a table (header repeated on each page),
//!   then the grand total
//!
//! ## Example
//!
//! ```rust,no_run
//! use occu_core::calculations::{aggregate, Row};
//! use occu_core::factors::{CodeSetId, FactorTable};
//! use occu_core::pdf::{render_detailed_pdf, render_summary_pdf, ReportContext};
//!
//! let table = FactorTable::for_code_set(CodeSetId::Ibc2024);
//! let result = aggregate(&[Row::new(1, "101", "Shop", "56", "Retail")], &table);
//!
//! let context = ReportContext::new(CodeSetId::Ibc2024);
//! std::fs::write("occupancy_summary.pdf", render_summary_pdf(&context, &result.totals)?).unwrap();
//! std::fs::write("occupancy_detailed.pdf", render_detailed_pdf(&context, &result)?).unwrap();
//! # Ok::<(), occu_core::errors::OccuError>(())
//! ```

use chrono::Utc;
use once_cell::sync::Lazy;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::{Aggregation, Totals};
use crate::errors::{OccuError, OccuResult};
use crate::factors::CodeSetId;
use crate::project::Project;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Bundled fonts, parsed once per process.
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
        .collect()
});

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    /// Font book
    book: LazyHash<FontBook>,
    /// Library (standard functions)
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// PDF Templates
// ============================================================================

/// Page setup shared by both reports
const PAGE_SETUP: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 56pt, bottom: 56pt, left: 40pt, right: 40pt),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[Job: #{{JOB_ID}}]],
      align(center)[#text(size: 8pt)[Page #counter(page).display()]],
      align(right)[#text(size: 8pt)[#{{DATE}}]],
    )
  ]
)

#set text(font: "DejaVu Sans Mono", size: 10pt)
"##;

/// Typst template for the per-type summary
const SUMMARY_TEMPLATE: &str = r##"
#text(size: 18pt, weight: "bold")[#{{TITLE}}]
#v(8pt)
{{PROJECT_INFO}}
#v(12pt)

#text(size: 12pt)[
{{TYPE_LINES}}
]

#v(10pt)
#text(size: 14pt, weight: "bold")[#{{GRAND_TOTAL}}]

#v(24pt)
#text(size: 8pt, fill: gray)[
  Factors are starter defaults. Verify against the code text adopted in your jurisdiction.
]
"##;

/// Typst template for the row-by-row report
const DETAILED_TEMPLATE: &str = r##"
#text(size: 18pt, weight: "bold")[#{{TITLE}}]
#v(8pt)
{{PROJECT_INFO}}
#v(12pt)

#table(
  columns: (auto, 1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, left, right, left, right),
  table.header(
    repeat: true,
    [*Room \#*], [*Room Name*], [*Area (m²)*], [*Type*], [*Load*],
  ),
{{TABLE_ROWS}}
)

#v(12pt)
#text(size: 12pt, weight: "bold")[#{{GRAND_TOTAL}}]
"##;

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Header information printed on reports.
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    pub code_set: CodeSetId,
    pub prepared_by: String,
    pub job_id: String,
    pub building: String,
}

impl ReportContext {
    pub fn new(code_set: CodeSetId) -> Self {
        ReportContext {
            code_set,
            ..Default::default()
        }
    }

    pub fn from_project(project: &Project) -> Self {
        ReportContext {
            code_set: project.settings.code_set,
            prepared_by: project.meta.prepared_by.clone(),
            job_id: project.meta.job_id.clone(),
            building: project.meta.building.clone(),
        }
    }

    fn project_info(&self) -> String {
        [
            ("Building", &self.building),
            ("Job", &self.job_id),
            ("Prepared by", &self.prepared_by),
        ]
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("#{} \\", typst_str(&format!("{label}: {value}"))))
        .collect::<Vec<_>>()
        .join("\n")
    }

    fn page_setup(&self) -> String {
        PAGE_SETUP
            .replace("{{JOB_ID}}", &typst_str(&self.job_id))
            .replace("{{DATE}}", &typst_str(&Utc::now().format("%Y-%m-%d").to_string()))
    }
}

fn grand_total_line(totals: &Totals) -> String {
    typst_str(&format!("Grand Total: {} occupants", totals.grand_total))
}

/// Typst source for the summary report.
pub fn summary_source(context: &ReportContext, totals: &Totals) -> String {
    let type_lines = totals
        .by_type
        .iter()
        .map(|t| format!("#{} \\", typst_str(&format!("{}: {} occupants", t.occupancy_type, t.occupant_load))))
        .collect::<Vec<_>>()
        .join("\n");

    let body = SUMMARY_TEMPLATE
        .replace(
            "{{TITLE}}",
            &typst_str(&format!("Occupancy Summary – {}", context.code_set.label())),
        )
        .replace("{{PROJECT_INFO}}", &context.project_info())
        .replace("{{TYPE_LINES}}", &type_lines)
        .replace("{{GRAND_TOTAL}}", &grand_total_line(totals));

    context.page_setup() + &body
}

/// Typst source for the detailed report.
pub fn detailed_source(context: &ReportContext, aggregation: &Aggregation) -> String {
    let table_rows = aggregation
        .rows
        .iter()
        .map(|row| {
            format!(
                "  [#{}], [#{}], [#{}], [#{}], [#{}],",
                typst_str(&row.number),
                typst_str(&row.name),
                typst_str(&row.area),
                typst_str(&row.occupancy_type),
                typst_str(&row.occupant_load.to_string()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = DETAILED_TEMPLATE
        .replace(
            "{{TITLE}}",
            &typst_str(&format!("Occupancy Detailed Report – {}", context.code_set.label())),
        )
        .replace("{{PROJECT_INFO}}", &context.project_info())
        .replace("{{TABLE_ROWS}}", &table_rows)
        .replace("{{GRAND_TOTAL}}", &grand_total_line(&aggregation.totals));

    context.page_setup() + &body
}

/// Render the summary report to PDF bytes.
pub fn render_summary_pdf(context: &ReportContext, totals: &Totals) -> OccuResult<Vec<u8>> {
    compile_pdf(summary_source(context, totals))
}

/// Render the detailed report to PDF bytes.
pub fn render_detailed_pdf(context: &ReportContext, aggregation: &Aggregation) -> OccuResult<Vec<u8>> {
    compile_pdf(detailed_source(context, aggregation))
}

fn compile_pdf(source: String) -> OccuResult<Vec<u8>> {
    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        OccuError::PdfRender {
            reason: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        OccuError::PdfRender {
            reason: format!("PDF export failed: {}", error_msgs.join("; ")),
        }
    })?;

    tracing::debug!(bytes = pdf_bytes.len(), "rendered pdf");
    Ok(pdf_bytes)
}

/// Quote user text as a Typst string literal
fn typst_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
