//! Pure HTML extraction over page snapshots.
//!
//! Everything here takes a captured HTML string and returns plain data; no
//! live element handles, no async. The grid and detail pages are ASP.NET
//! GridView markup, so extraction is fixed-position: known table ids, known
//! cell orders, a leading row-index column on the result grid. Rows that
//! don't match the expected shape are skipped or recorded as warnings, never
//! errors.

use scraper::{ElementRef, Html, Selector};

use crate::core::types::{
    Appeal, BasicInfo, Classification, Detainer, GridRow, Infraction, InmateDetail, PagerCell,
    ParoleAction, Sentence, WorkProgram,
};

/// (count label id, table id) pairs for the seven optional detail sections.
const SECTION_SENTENCES: (&str, &str) = ("lblCommit", "GVCommitment");
const SECTION_INFRACTIONS: (&str, &str) = ("lblInfraction", "GVInfractions");
const SECTION_APPEALS: (&str, &str) = ("lblOutcome", "GVAppeal");
const SECTION_CLASSIFICATIONS: (&str, &str) = ("lblProfile", "GVProfileClass");
const SECTION_PAROLE_ACTIONS: (&str, &str) = ("lblParolAction", "GVParoleAction");
const SECTION_WORK_PROGRAMS: (&str, &str) = ("lblWork", "GVWorkProgram");
const SECTION_DETAINERS: (&str, &str) = ("lblDetainer", "GVDetainer");

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

// ── Result grid ──────────────────────────────────────────────────────────────

/// Extract the data rows of the result grid from a snapshot.
///
/// Each `tr.GridViewRow` carries a leading row-index cell followed by five
/// data cells (id link, photo button, last name, first/middle name, admitted
/// date). Rows with fewer than five data cells are skipped without error.
pub fn parse_grid_rows(html: &str) -> Vec<GridRow> {
    let doc = Html::parse_document(html);
    let mut rows = Vec::new();

    let Ok(row_sel) = Selector::parse("table#gvInmate tr.GridViewRow") else {
        return rows;
    };
    let Ok(td_sel) = Selector::parse("td") else {
        return rows;
    };
    let Ok(a_sel) = Selector::parse("a") else {
        return rows;
    };
    let Ok(input_sel) = Selector::parse("input") else {
        return rows;
    };

    for row in doc.select(&row_sel) {
        let cells: Vec<ElementRef> = row.select(&td_sel).collect();
        // leading row-index cell + 5 data cells
        if cells.len() < 6 {
            continue;
        }
        let cells = &cells[1..];

        let id_link = cells[0].select(&a_sel).next();
        let inmate_id = match id_link {
            Some(a) => cell_text(a),
            None => cell_text(cells[0]),
        };
        if inmate_id.is_empty() {
            continue;
        }

        let photo_url = cells[1]
            .select(&input_sel)
            .next()
            .and_then(|input| input.value().attr("src"))
            .map(str::to_string);

        rows.push(GridRow {
            inmate_id,
            photo_url,
            last_name: cell_text(cells[2]),
            first_name_middle_initial: cell_text(cells[3]),
            admitted_date: cell_text(cells[4]),
            has_detail_link: id_link.is_some(),
        });
    }

    rows
}

/// Extract the pager cells from the grid's footer row (`td[colspan='6']`).
/// Single-page result sets render no pager at all; an empty vec means stop.
pub fn parse_pager_cells(html: &str) -> Vec<PagerCell> {
    let doc = Html::parse_document(html);
    let mut cells = Vec::new();

    let Ok(pager_sel) = Selector::parse("table#gvInmate td[colspan='6'] td") else {
        return cells;
    };
    let Ok(a_sel) = Selector::parse("a") else {
        return cells;
    };

    for td in doc.select(&pager_sel) {
        let label = cell_text(td);
        if label.is_empty() {
            continue;
        }
        cells.push(PagerCell {
            label,
            is_link: td.select(&a_sel).next().is_some(),
        });
    }

    cells
}

// ── Detail page ──────────────────────────────────────────────────────────────

/// Parse a detail-page snapshot into a full `InmateDetail`.
///
/// Every sub-table and section is attempted independently; a failure yields a
/// warning on the record and the rest of the page is still collected.
pub fn parse_inmate_detail(html: &str) -> InmateDetail {
    let doc = Html::parse_document(html);
    let mut detail = InmateDetail::default();

    parse_basic_info(&doc, &mut detail);

    detail.sentences = collect_section(
        &doc,
        SECTION_SENTENCES,
        Sentence::FIELDS.len(),
        &mut detail.warnings,
        |c| Sentence {
            commit_num: c[0].clone(),
            sentence_length: c[1].clone(),
            county: c[2].clone(),
            cause_num: c[3].clone(),
            offense_date: c[4].clone(),
            sentence_date: c[5].clone(),
            sentence_status: c[6].clone(),
            crime: c[7].clone(),
        },
    );

    detail.infractions = collect_section(
        &doc,
        SECTION_INFRACTIONS,
        Infraction::FIELDS.len(),
        &mut detail.warnings,
        |c| Infraction {
            violation_date: c[0].clone(),
            infraction: c[1].clone(),
            verdict_date: c[2].clone(),
            verdict: c[3].clone(),
        },
    );

    detail.appeals = collect_section(
        &doc,
        SECTION_APPEALS,
        Appeal::FIELDS.len(),
        &mut detail.warnings,
        |c| Appeal {
            appeal_date: c[0].clone(),
            outcome: c[1].clone(),
            as_of_date: c[2].clone(),
        },
    );

    detail.classifications = collect_section(
        &doc,
        SECTION_CLASSIFICATIONS,
        Classification::FIELDS.len(),
        &mut detail.warnings,
        |c| Classification {
            complete_date: c[0].clone(),
            classification_type: c[1].clone(),
            custody_risk: c[2].clone(),
            internal_risk: c[3].clone(),
        },
    );

    detail.parole_actions = collect_section(
        &doc,
        SECTION_PAROLE_ACTIONS,
        ParoleAction::FIELDS.len(),
        &mut detail.warnings,
        |c| ParoleAction {
            hearing_date: c[0].clone(),
            statute: c[1].clone(),
            action: c[2].clone(),
        },
    );

    detail.work_programs = collect_section(
        &doc,
        SECTION_WORK_PROGRAMS,
        WorkProgram::FIELDS.len(),
        &mut detail.warnings,
        |c| WorkProgram {
            assigned_date: c[0].clone(),
            completed_date: c[1].clone(),
            work_assignment: c[2].clone(),
        },
    );

    detail.detainers = collect_section(
        &doc,
        SECTION_DETAINERS,
        Detainer::FIELDS.len(),
        &mut detail.warnings,
        |c| Detainer {
            detainer_date: c[0].clone(),
            detainer_type: c[1].clone(),
            charges: c[2].clone(),
            authority: c[3].clone(),
            agreement_date: c[4].clone(),
        },
    );

    detail
}

/// The four basic-info sub-tables, each holding a single data row. A missing
/// table leaves its fields `None` and records a warning.
fn parse_basic_info(doc: &Html, detail: &mut InmateDetail) {
    let basic = &mut detail.basic_info;

    match first_row_cells(doc, "GridView8") {
        Some(c) if c.len() >= 4 => {
            basic.gender = Some(c[0].clone());
            basic.height = Some(c[1].clone());
            basic.weight = Some(c[2].clone());
            basic.hair_color = Some(c[3].clone());
        }
        _ => detail
            .warnings
            .push("basic info: physical description table missing".to_string()),
    }

    match first_row_cells(doc, "GridView9") {
        Some(c) if c.len() >= 4 => {
            basic.eye_color = Some(c[0].clone());
            basic.ethnic_origin = Some(c[1].clone());
            basic.custody_class = Some(c[2].clone());
            basic.admission = Some(c[3].clone());
        }
        _ => detail
            .warnings
            .push("basic info: custody table missing".to_string()),
    }

    match first_row_cells(doc, "GridView11") {
        Some(c) if c.len() >= 2 => {
            basic.release_date = Some(c[0].clone());
            basic.release_type = Some(c[1].clone());
        }
        _ => detail
            .warnings
            .push("basic info: release table missing".to_string()),
    }

    match first_row_cells(doc, "GridView12") {
        Some(c) if c.len() >= 4 => {
            basic.complex = Some(c[0].clone());
            basic.unit = Some(c[1].clone());
            basic.last_movement = Some(c[2].clone());
            basic.status = Some(c[3].clone());
        }
        _ => detail
            .warnings
            .push("basic info: placement table missing".to_string()),
    }
}

/// Read a section's record count from its `span#lbl…` header label
/// ("N Records Found"). An absent or unparsable label counts as zero.
fn section_count(doc: &Html, label_id: &str) -> usize {
    let Ok(sel) = Selector::parse(&format!("span#{}", label_id)) else {
        return 0;
    };
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>())
        .and_then(|text| {
            text.split_whitespace()
                .next()
                .and_then(|n| n.parse::<usize>().ok())
        })
        .unwrap_or(0)
}

/// Cell texts of a basic-info sub-table's single data row, or `None` when
/// the table (or its row) is absent.
fn first_row_cells(doc: &Html, table_id: &str) -> Option<Vec<String>> {
    table_rows(doc, table_id)?.into_iter().next()
}

/// Cell texts of every `tr.GridViewRow` in the given table, or `None` when
/// the table itself is absent.
fn table_rows(doc: &Html, table_id: &str) -> Option<Vec<Vec<String>>> {
    let table_sel = Selector::parse(&format!("table#{}", table_id)).ok()?;
    let table = doc.select(&table_sel).next()?;
    let row_sel = Selector::parse("tr.GridViewRow").ok()?;
    let td_sel = Selector::parse("td").ok()?;

    Some(
        table
            .select(&row_sel)
            .map(|row| row.select(&td_sel).map(cell_text).collect())
            .collect(),
    )
}

/// Shared shape of the seven optional sections: the count label gates the
/// table lookup entirely — a zero count means the table is never consulted.
/// A short row stops the section at the rows parsed so far, mirroring the
/// partial results a mid-section failure leaves behind.
fn collect_section<T>(
    doc: &Html,
    (label_id, table_id): (&str, &str),
    expected_cells: usize,
    warnings: &mut Vec<String>,
    build: impl Fn(&[String]) -> T,
) -> Vec<T> {
    if section_count(doc, label_id) == 0 {
        return Vec::new();
    }

    let Some(rows) = table_rows(doc, table_id) else {
        warnings.push(format!("{}: records reported but table missing", table_id));
        return Vec::new();
    };

    let mut out = Vec::new();
    for cells in rows {
        if cells.len() < expected_cells {
            warnings.push(format!(
                "{}: row with {} cells, expected {}",
                table_id,
                cells.len(),
                expected_cells
            ));
            break;
        }
        out.push(build(&cells));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_page(body: &str) -> String {
        format!("<html><body><table id=\"gvInmate\">{}</table></body></html>", body)
    }

    const ROW_FULL: &str = r#"<tr class="GridViewRow">
        <td>1</td>
        <td><a href="detail.aspx?id=100001">100001</a></td>
        <td><input type="image" src="Photos/100001.jpg"/></td>
        <td>SMITH</td>
        <td>ADAM J</td>
        <td>01/02/2020</td>
    </tr>"#;

    const ROW_NO_PHOTO: &str = r#"<tr class="GridViewRow">
        <td>2</td>
        <td><a href="detail.aspx?id=100002">100002</a></td>
        <td></td>
        <td>SMITH</td>
        <td>BRIAN</td>
        <td>03/04/2019</td>
    </tr>"#;

    #[test]
    fn full_row_maps_all_five_cells() {
        let html = grid_page(ROW_FULL);
        let rows = parse_grid_rows(&html);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.inmate_id, "100001");
        assert_eq!(row.photo_url.as_deref(), Some("Photos/100001.jpg"));
        assert_eq!(row.last_name, "SMITH");
        assert_eq!(row.first_name_middle_initial, "ADAM J");
        assert_eq!(row.admitted_date, "01/02/2020");
        assert!(row.has_detail_link);
    }

    #[test]
    fn short_rows_are_skipped_without_error() {
        let html = grid_page(
            r#"<tr class="GridViewRow"><td>1</td><td><a>100001</a></td><td>SMITH</td></tr>"#,
        );
        assert!(parse_grid_rows(&html).is_empty());
    }

    #[test]
    fn missing_photo_cell_yields_no_url() {
        let html = grid_page(ROW_NO_PHOTO);
        let rows = parse_grid_rows(&html);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].photo_url.is_none());
    }

    #[test]
    fn linkless_id_cell_still_extracts_the_id() {
        let html = grid_page(
            r#"<tr class="GridViewRow">
                <td>1</td><td>100003</td><td></td>
                <td>SMITH</td><td>CARL</td><td>05/06/2018</td>
            </tr>"#,
        );
        let rows = parse_grid_rows(&html);
        assert_eq!(rows[0].inmate_id, "100003");
        assert!(!rows[0].has_detail_link);
    }

    #[test]
    fn pager_cells_distinguish_links_from_the_current_page() {
        let html = grid_page(concat!(
            r#"<tr class="GridViewRow"><td>1</td><td><a>1</a></td><td></td><td>A</td><td>B</td><td>C</td></tr>"#,
            r##"<tr><td colspan="6"><table><tr>
                <td><span>1</span></td>
                <td><a href="#">2</a></td>
                <td><a href="#">3</a></td>
            </tr></table></td></tr>"##,
        ));
        let cells = parse_pager_cells(&html);
        assert_eq!(
            cells,
            vec![
                PagerCell { label: "1".to_string(), is_link: false },
                PagerCell { label: "2".to_string(), is_link: true },
                PagerCell { label: "3".to_string(), is_link: true },
            ]
        );
    }

    #[test]
    fn absent_pager_yields_no_cells() {
        let html = grid_page(ROW_FULL);
        assert!(parse_pager_cells(&html).is_empty());
    }

    fn detail_page(extra: &str) -> String {
        format!(
            r#"<html><body>
            <table id="GridView8" class="BorderGridView"><tr class="GridViewRow">
                <td>Male</td><td>5' 10"</td><td>180</td><td>Brown</td></tr></table>
            <table id="GridView9" class="BorderGridView"><tr class="GridViewRow">
                <td>Brown</td><td>Caucasian</td><td>Medium</td><td>10/11/2015</td></tr></table>
            <table id="GridView11" class="BorderGridView"><tr class="GridViewRow">
                <td>12/01/2026</td><td>ERCD</td></tr></table>
            <table id="GridView12" class="BorderGridView"><tr class="GridViewRow">
                <td>TUCSON</td><td>SANTA RITA</td><td>02/03/2021</td><td>ACTIVE</td></tr></table>
            {}
            </body></html>"#,
            extra
        )
    }

    #[test]
    fn basic_info_fills_all_four_sub_tables() {
        let detail = parse_inmate_detail(&detail_page(""));
        let b = &detail.basic_info;
        assert_eq!(b.gender.as_deref(), Some("Male"));
        assert_eq!(b.hair_color.as_deref(), Some("Brown"));
        assert_eq!(b.custody_class.as_deref(), Some("Medium"));
        assert_eq!(b.release_type.as_deref(), Some("ERCD"));
        assert_eq!(b.status.as_deref(), Some("ACTIVE"));
        assert!(detail.warnings.is_empty());
    }

    #[test]
    fn missing_sub_table_yields_partial_basic_info_and_warning() {
        let html = r#"<html><body>
            <table id="GridView8" class="BorderGridView"><tr class="GridViewRow">
                <td>Male</td><td>6' 1"</td><td>200</td><td>Black</td></tr></table>
            </body></html>"#;
        let detail = parse_inmate_detail(html);
        assert_eq!(detail.basic_info.gender.as_deref(), Some("Male"));
        assert!(detail.basic_info.eye_color.is_none());
        assert!(detail.basic_info.release_date.is_none());
        assert_eq!(detail.warnings.len(), 3);
    }

    #[test]
    fn zero_count_gates_the_table_lookup() {
        // The table is present and full of rows, but the label says zero —
        // nothing may be read from it.
        let extra = r#"
            <span id="lblCommit">0 Records Found</span>
            <table id="GVCommitment" class="BorderGridView"><tr class="GridViewRow">
                <td>1</td><td>5Y</td><td>PIMA</td><td>CR123</td>
                <td>01/01/2010</td><td>02/01/2010</td><td>ACTIVE</td><td>THEFT</td>
            </tr></table>"#;
        let detail = parse_inmate_detail(&detail_page(extra));
        assert!(detail.sentences.is_empty());
        assert!(detail.warnings.is_empty());
    }

    #[test]
    fn positive_count_parses_every_section_row() {
        let extra = r#"
            <span id="lblCommit">2 Records Found</span>
            <table id="GVCommitment" class="BorderGridView">
                <tr class="GridViewRow">
                    <td>1</td><td>5Y</td><td>PIMA</td><td>CR123</td>
                    <td>01/01/2010</td><td>02/01/2010</td><td>ACTIVE</td><td>THEFT</td>
                </tr>
                <tr class="GridViewRow">
                    <td>2</td><td>2Y</td><td>MARICOPA</td><td>CR456</td>
                    <td>03/01/2012</td><td>04/01/2012</td><td>EXPIRED</td><td>BURGLARY</td>
                </tr>
            </table>"#;
        let detail = parse_inmate_detail(&detail_page(extra));
        assert_eq!(detail.sentences.len(), 2);
        assert_eq!(detail.sentences[0].crime, "THEFT");
        assert_eq!(detail.sentences[1].county, "MARICOPA");
    }

    #[test]
    fn reported_but_missing_section_table_records_a_warning() {
        let extra = r#"<span id="lblDetainer">3 Records Found</span>"#;
        let detail = parse_inmate_detail(&detail_page(extra));
        assert!(detail.detainers.is_empty());
        assert!(detail
            .warnings
            .iter()
            .any(|w| w.contains("GVDetainer")));
    }

    #[test]
    fn short_section_row_stops_parsing_with_warning() {
        let extra = r#"
            <span id="lblInfraction">2 Records Found</span>
            <table id="GVInfractions" class="BorderGridView">
                <tr class="GridViewRow">
                    <td>01/05/2022</td><td>CONTRABAND</td><td>01/20/2022</td><td>GUILTY</td>
                </tr>
                <tr class="GridViewRow"><td>02/06/2022</td></tr>
            </table>"#;
        let detail = parse_inmate_detail(&detail_page(extra));
        assert_eq!(detail.infractions.len(), 1);
        assert!(detail
            .warnings
            .iter()
            .any(|w| w.contains("GVInfractions")));
    }

    #[test]
    fn unparsable_count_label_counts_as_zero() {
        let extra = r#"
            <span id="lblWork">No Records Found</span>
            <table id="GVWorkProgram" class="BorderGridView">
                <tr class="GridViewRow"><td>a</td><td>b</td><td>c</td></tr>
            </table>"#;
        let detail = parse_inmate_detail(&detail_page(extra));
        assert!(detail.work_programs.is_empty());
    }
}
