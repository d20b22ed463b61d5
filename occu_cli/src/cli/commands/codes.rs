//! `occucalc codes` command - List the built-in code sets

use miette::Result;
use tabled::{builder::Builder, settings::Style};

use occu_core::CodeSetId;

pub fn run() -> Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Label"]);
    for code in CodeSetId::ALL {
        let marker = if code == CodeSetId::default() { " (default)" } else { "" };
        builder.push_record([code.id().to_string(), format!("{}{marker}", code.label())]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
