use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::{Table, builder::Builder};

use crate::{
    management::BulkDeleteReport,
    schema::EntitySchema,
    types::{BulkDeleteTableRow, Entity, FieldTableRow},
};

const CELL_WIDTH: usize = 40;

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(style);
    pb
}

fn cell(entity: &Entity, field: &str) -> String {
    let text = entity.field_text(field).unwrap_or_default();
    if text.chars().count() > CELL_WIDTH {
        let cut: String = text.chars().take(CELL_WIDTH - 1).collect();
        format!("{}…", cut)
    } else {
        text
    }
}

/// List table with `id`, the title field and the schema's columns.
pub fn entity_table(schema: &EntitySchema, entities: &[&Entity]) -> Table {
    let mut header = vec!["id", schema.title_field];
    header.extend(schema.columns.iter().copied());

    let mut builder = Builder::default();
    builder.push_record(header.iter().copied());
    for entity in entities {
        builder.push_record(header.iter().map(|field| cell(entity, field)));
    }
    builder.build()
}

/// Two-column table of every attribute of one entity.
pub fn detail_table(entity: &Entity) -> Table {
    let mut rows = vec![FieldTableRow {
        field: "id".to_string(),
        value: entity.id.to_string(),
    }];
    if let Some(status) = &entity.status {
        rows.push(FieldTableRow {
            field: "status".to_string(),
            value: status.to_string(),
        });
    }
    rows.extend(entity.fields.keys().map(|name| FieldTableRow {
        field: name.clone(),
        value: entity.field_text(name).unwrap_or_default(),
    }));
    Table::new(rows)
}

pub fn bulk_delete_table(report: &BulkDeleteReport) -> Table {
    let deleted = report.deleted.iter().map(|id| BulkDeleteTableRow {
        id: id.to_string(),
        outcome: "deleted".to_string(),
    });
    let failed = report.failed.iter().map(|(id, e)| BulkDeleteTableRow {
        id: id.to_string(),
        outcome: e.to_string(),
    });
    let mut rows: Vec<BulkDeleteTableRow> = deleted.chain(failed).collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));
    Table::new(rows)
}
