//! CSV export of photo counts.

use crate::{
    key,
    photos::{self, PhotoMap},
    state::GroupEntry,
    tables::Table,
    types::{CUT_COUNT, ZERO_COUNTS},
};

/// Leading characters that spreadsheets treat as a formula.
const FORMULA_TRIGGERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Renders `photos` as CSV: a header row, then one row per member of every
/// enabled generation of every enabled group, in catalog order.
///
/// Individually opted-out members are still listed. Members without an
/// entry get zero counts. Rows end with `\n`, including the last.
pub fn to_csv(
    photos: &PhotoMap,
    groups: &[GroupEntry],
    cut_labels: &[&str; CUT_COUNT],
    member_header: &str,
) -> String {
    let mut out = String::new();
    push_row(&mut out, std::iter::once(member_header).chain(cut_labels.iter().copied()));

    for group in groups.iter().filter(|g| g.enabled) {
        for generation in group.generations.iter().filter(|g| g.enabled) {
            for member in generation.members() {
                let counts = photos
                    .get(&key::encode(group.id(), member.fullname))
                    .unwrap_or(&ZERO_COUNTS);
                let counts = counts.map(|n| n.to_string());
                push_row(
                    &mut out,
                    std::iter::once(member.fullname).chain(counts.iter().map(String::as_str)),
                );
            }
        }
    }
    out
}

/// Exports one table using its own enablement settings.
pub fn table_to_csv(table: &Table, cut_labels: &[&str; CUT_COUNT], member_header: &str) -> String {
    let state = table.group_state();
    let groups: Vec<_> = state.groups.iter().map(|g| *g.group).collect();
    let map = photos::photo_data_to_map(&table.photo_data, &groups);
    to_csv(&map, &state.groups, cut_labels, member_header)
}

/// Quotes `field` when it holds a delimiter, quote, line break, or starts
/// with a formula trigger. Triggers also get a tab prepended inside the quotes.
pub fn escape_field(field: &str) -> String {
    let formula = field.starts_with(FORMULA_TRIGGERS);
    let needs_quotes = formula || field.contains([',', '"', '\n', '\r']);
    if !needs_quotes {
        return field.to_string();
    }

    let mut out = String::with_capacity(field.len() + 3);
    out.push('"');
    if formula {
        out.push('\t');
    }
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
    out
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push('\n');
}
