use std::{fs, path::PathBuf};

use db::models::{
    field::{CreateField, DataType, Field, FieldWithFills, UpdateField},
    fill::{CreateFill, Fill, FillWithField, UpdateFill},
};
use server::routes::health::HealthStatus;
use ts_rs::TS;
use utils::{response::ErrorResponse, validation::BodyIssue};

const HEADER: &str = "// This file was generated by `generate_types`.\n// Do not edit it by hand; rerun `cargo run --bin generate_types`.\n\n";

fn generate_types_content() -> String {
    let decls = [
        DataType::decl(),
        Field::decl(),
        FieldWithFills::decl(),
        CreateField::decl(),
        UpdateField::decl(),
        Fill::decl(),
        FillWithField::decl(),
        CreateFill::decl(),
        UpdateFill::decl(),
        BodyIssue::decl(),
        ErrorResponse::decl(),
        HealthStatus::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|decl| format!("export {}", decl.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{HEADER}{body}\n")
}

fn main() -> anyhow::Result<()> {
    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shared/types.ts"));

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out, generate_types_content())?;

    println!("Generated TypeScript types at {}", out.display());
    Ok(())
}
