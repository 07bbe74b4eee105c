//! Plain-text table rendering of a grid view.

use std::fmt::Write;

use gestion_lib::grid::Direction;
use gestion_lib::grid::GridView;
use gestion_lib::model::Alignment;
use gestion_lib::model::GridRow;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Widest a column grows when it has no declared width.
const MAX_AUTO_WIDTH: usize = 40;

pub fn display_width(s: &str) -> usize {
    s.width()
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let target_width = max_width.saturating_sub(1);
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push('…');
    result
}

/// Pads `text` to exactly `width` display columns.
pub fn pad(text: &str, width: usize, align: Alignment) -> String {
    let text = truncate_to_width(text, width);
    let free = width.saturating_sub(display_width(&text));
    let left = match align {
        Alignment::Left => 0,
        Alignment::Center => free / 2,
        Alignment::Right => free,
    };
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(free - left))
}

/// Lays out the view as a text table.
///
/// Collapsed groups show only their heading.
pub fn render<R: GridRow>(view: &GridView<'_, R>) -> String {
    let headers: Vec<String> = view
        .columns
        .iter()
        .map(|c| match view.sort.direction_for(&c.key) {
            Some(Direction::Asc) => format!("{} ▲", c.label),
            Some(Direction::Desc) => format!("{} ▼", c.label),
            None => c.label.clone(),
        })
        .collect();

    let cells: Vec<Vec<Vec<String>>> = view
        .groups
        .iter()
        .map(|g| {
            g.rows
                .iter()
                .map(|row| view.columns.iter().map(|c| view.cell(*row, c)).collect())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = view
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| match c.width {
            Some(w) => usize::from(w),
            None => cells
                .iter()
                .flatten()
                .map(|r| display_width(&r[i]))
                .chain(std::iter::once(display_width(&headers[i])))
                .max()
                .unwrap_or(0)
                .min(MAX_AUTO_WIDTH),
        })
        .collect();

    let padding = " ".repeat(view.density.cell_padding());
    let spacing = view.density.row_spacing();
    let line = |fields: &[String], aligns: &mut dyn Iterator<Item = Alignment>| -> String {
        let parts: Vec<String> = fields
            .iter()
            .zip(&widths)
            .map(|(f, w)| {
                let align = aligns.next().unwrap_or_default();
                format!("{}{}{}", padding, pad(f, *w, align), padding)
            })
            .collect();
        parts.join("│").trim_end().to_string()
    };

    let mut out = String::new();
    let header = line(&headers, &mut std::iter::repeat(Alignment::Left));
    let _ = writeln!(out, "{}", header);
    let rule_width: usize = widths.iter().sum::<usize>()
        + widths.len() * 2 * padding.len()
        + widths.len().saturating_sub(1);
    let _ = writeln!(out, "{}", "─".repeat(rule_width));

    let grouped = view.is_grouped();
    for (group, rows) in view.groups.iter().zip(&cells) {
        if grouped {
            let marker = if group.expanded { '▾' } else { '▸' };
            let _ = writeln!(out, "{} {} ({})", marker, group.label, group.len());
            if !group.expanded {
                continue;
            }
        }
        for row in rows {
            let mut aligns = view.columns.iter().map(|c| c.align);
            let _ = writeln!(out, "{}", line(row, &mut aligns));
            for _ in 0..spacing {
                out.push('\n');
            }
        }
    }

    let _ = writeln!(out, "{}", footer(view));
    out
}

/// Page position and row counts.
pub fn footer<R>(view: &GridView<'_, R>) -> String {
    let counts = if view.filtered_count == view.total_rows {
        format!("{} lignes", view.filtered_count)
    } else {
        format!("{} lignes sur {}", view.filtered_count, view.total_rows)
    };
    if view.paginated {
        format!(
            "Page {}/{} · {}",
            view.pagination.current_page(),
            view.pagination.total_pages(),
            counts
        )
    } else {
        counts
    }
}

#[cfg(test)]
mod tests {
    use gestion_lib::grid::DataGrid;
    use gestion_lib::grid::GridOptions;
    use gestion_lib::grid::GroupBy;
    use gestion_lib::grid::SortConfig;
    use gestion_lib::model::Column;
    use gestion_lib::model::Row;

    use super::*;

    #[test]
    fn test_truncate_and_pad() {
        assert_eq!(truncate_to_width("Bernard", 4), "Ber…");
        assert_eq!(pad("ab", 5, Alignment::Right), "   ab");
        assert_eq!(pad("ab", 5, Alignment::Center), " ab  ");
        assert_eq!(display_width("été"), 3);
    }

    #[test]
    fn test_render_grouped_table() {
        let mut grid = DataGrid::new(
            vec![
                Column::new("nom", "Nom"),
                Column::new("montant", "Montant").align(Alignment::Right),
                Column::new("ville", "Ville"),
            ],
            GridOptions::default()
                .visible_columns(["nom", "montant"])
                .sort(SortConfig::asc("nom")),
        );
        grid.set_rows(vec![
            Row::new(1).set("nom", "Durand").set("montant", 120).set("ville", "Lyon"),
            Row::new(2).set("nom", "Martin").set("montant", 80).set("ville", "Paris"),
        ]);
        grid.set_group_by(GroupBy::column("ville"));
        grid.toggle_group("Lyon");

        let text = render(&grid.view());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], " Nom ▲  │ Montant");
        assert_eq!(lines[2], "▾ Lyon (1)");
        assert_eq!(lines[3], " Durand │     120");
        assert_eq!(lines[4], "▸ Paris (1)");
        assert_eq!(lines[5], "Page 1/1 · 2 lignes");
    }
}
