//! Integration tests for table reconstruction through the document builder.

use unlayout::{
    build_document, Diagnostic, Document, Fragment, ReconstructOptions, TableBlock, Thresholds,
};

const TH: &str = "TableHeader";

fn header(text: &str, x: f32, y: f32, width: f32) -> Fragment {
    Fragment::new(text, x, y, width, 9.0).with_style(TH)
}

fn cell(text: &str, x: f32, y: f32, width: f32) -> Fragment {
    Fragment::new(text, x, y, width, 9.0)
}

fn options() -> ReconstructOptions {
    ReconstructOptions::new().with_table_header_style(TH)
}

fn build(pages: Vec<Vec<Fragment>>) -> Document {
    build_document(&pages, &options()).unwrap()
}

fn only_table(doc: &Document) -> &TableBlock {
    let tables: Vec<&TableBlock> = doc.parts().filter_map(|p| p.as_table()).collect();
    assert_eq!(tables.len(), 1, "expected exactly one table");
    tables[0]
}

#[test]
fn test_class_table_row_segmentation() {
    let doc = build(vec![vec![
        Fragment::new("The Barbarian", 50.0, 740.0, 120.0, 14.0),
        header("Level", 50.0, 700.0, 30.0),
        header("Proficiency Bonus", 100.0, 700.0, 80.0),
        header("Features", 200.0, 700.0, 100.0),
        header("Rages", 350.0, 700.0, 30.0),
        cell("5th", 50.0, 680.0, 15.0),
        cell("+3", 130.0, 680.0, 10.0),
        cell("Extra Attack,", 200.0, 680.0, 55.0),
        cell("Fast Movement", 200.0, 671.0, 60.0),
        cell("3", 362.0, 675.0, 5.0),
    ]]);

    let table = only_table(&doc);
    assert_eq!(
        table.header_strings(),
        vec![vec!["Level", "Proficiency Bonus", "Features", "Rages"]]
    );
    assert_eq!(
        table.row_strings(),
        vec![vec!["5th", "+3", "Extra Attack, Fast Movement", "3"]]
    );
    assert!(doc.diagnostics.is_empty());
}

#[test]
fn test_vertical_header_merge() {
    let doc = build(vec![vec![
        header("The Barbarian", 50.0, 730.0, 120.0),
        header("Proficiency", 100.0, 720.0, 50.0),
        header("Level", 50.0, 710.0, 30.0),
        header("Bonus", 105.0, 710.0, 30.0),
        header("Features", 200.0, 710.0, 100.0),
        cell("1st", 50.0, 690.0, 15.0),
        cell("+2", 110.0, 690.0, 10.0),
        cell("Rage", 200.0, 690.0, 20.0),
    ]]);

    let table = only_table(&doc);
    assert_eq!(
        table.header_strings(),
        vec![
            vec!["The Barbarian"],
            vec!["Level", "Proficiency Bonus", "Features"],
        ]
    );
    assert_eq!(table.row_strings(), vec![vec!["1st", "+2", "Rage"]]);
}

#[test]
fn test_split_column_consolidation() {
    // each row's last cell sits in the next page column: one arrives lower
    // on the page, the other higher
    let doc = build(vec![vec![
        header("Level", 50.0, 700.0, 30.0),
        header("Features", 100.0, 700.0, 100.0),
        header("Notes", 210.0, 700.0, 40.0),
        cell("1st", 50.0, 680.0, 15.0),
        cell("Rage", 100.0, 680.0, 20.0),
        cell("Unarmored Defense", 400.0, 600.0, 70.0),
        cell("2nd", 50.0, 560.0, 15.0),
        cell("Danger Sense", 100.0, 560.0, 50.0),
        cell("Reckless Attack", 400.0, 750.0, 60.0),
    ]]);

    let table = only_table(&doc);
    assert_eq!(
        table.row_strings(),
        vec![
            vec!["1st", "Rage", "Unarmored Defense"],
            vec!["2nd", "Danger Sense", "Reckless Attack"],
        ]
    );
}

#[test]
fn test_table_continued_in_next_page_column() {
    let doc = build(vec![vec![
        header("Level", 50.0, 700.0, 30.0),
        header("Features", 100.0, 700.0, 100.0),
        cell("1st", 50.0, 120.0, 15.0),
        cell("Rage", 100.0, 120.0, 20.0),
        cell("2nd", 50.0, 100.0, 15.0),
        cell("Danger Sense", 100.0, 100.0, 50.0),
        cell("3rd", 350.0, 700.0, 15.0),
        cell("Primal Path", 400.0, 700.0, 50.0),
        cell("4th", 350.0, 680.0, 15.0),
        cell("Ability Score", 400.0, 680.0, 55.0),
        cell("5th", 350.0, 660.0, 15.0),
        cell("Extra Attack", 400.0, 660.0, 50.0),
    ]]);

    let table = only_table(&doc);
    assert_eq!(table.row_count(), 5);
    assert_eq!(table.row_strings()[2], vec!["3rd", "Primal Path"]);
    assert_eq!(table.row_strings()[4], vec!["5th", "Extra Attack"]);
    assert!(table.body_rows().all(|row| row.len() == 2));
}

#[test]
fn test_tall_whitespace_keeps_table_open() {
    let doc = build(vec![vec![
        header("Level", 50.0, 700.0, 30.0),
        header("Features", 100.0, 700.0, 100.0),
        cell("1st", 50.0, 690.0, 15.0),
        cell("Rage", 100.0, 690.0, 20.0),
        Fragment::new(" ", 130.0, 690.0, 4.0, 12.0),
        cell("2nd", 50.0, 680.0, 15.0),
        cell("Danger Sense", 100.0, 680.0, 50.0),
    ]]);

    assert_eq!(doc.section_count(), 1);
    assert_eq!(doc.paragraph_count(), 0);
    let table = only_table(&doc);
    assert_eq!(
        table.row_strings(),
        vec![vec!["1st", "Rage"], vec!["2nd", "Danger Sense"]]
    );
}

#[test]
fn test_empty_row_pruning() {
    let doc = build(vec![vec![
        header("d6", 50.0, 700.0, 15.0),
        header("Trinket", 100.0, 700.0, 100.0),
        cell("\u{200B}", 50.0, 690.0, 5.0),
        cell(" ", 100.0, 690.0, 5.0),
        cell("1", 50.0, 680.0, 5.0),
        cell("A mummified goblin hand", 100.0, 680.0, 90.0),
    ]]);

    let table = only_table(&doc);
    assert_eq!(table.row_strings(), vec![vec!["1", "A mummified goblin hand"]]);
    assert!(table.body_rows().all(|row| !row.is_empty()));
}

#[test]
fn test_table_continues_on_next_page() {
    let doc = build(vec![
        vec![
            header("Level", 50.0, 700.0, 30.0),
            header("Features", 100.0, 700.0, 100.0),
            cell("1st", 50.0, 80.0, 15.0),
            cell("Rage", 100.0, 80.0, 20.0),
        ],
        vec![
            cell("2nd", 50.0, 760.0, 15.0),
            cell("Danger Sense", 100.0, 760.0, 50.0),
        ],
    ]);

    let table = only_table(&doc);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.row_strings()[1], vec!["2nd", "Danger Sense"]);
}

#[test]
fn test_larger_text_ends_table() {
    let doc = build(vec![vec![
        header("Level", 50.0, 700.0, 30.0),
        header("Rages", 100.0, 700.0, 30.0),
        cell("1st", 50.0, 690.0, 15.0),
        cell("2", 100.0, 690.0, 5.0),
        Fragment::new("Rage", 50.0, 660.0, 40.0, 12.0),
        Fragment::new("In battle, you fight", 50.0, 650.0, 90.0, 9.5),
    ]]);

    assert_eq!(doc.table_count(), 1);
    assert_eq!(doc.section_count(), 3);
    assert_eq!(doc.sections[1].plain_text(), "Rage");
    assert_eq!(doc.sections[2].plain_text(), "In battle, you fight");
}

#[test]
fn test_too_many_header_rows_degrades() {
    let doc = build(vec![vec![
        header("Title", 50.0, 740.0, 100.0),
        header("Group", 50.0, 730.0, 100.0),
        header("Sub", 50.0, 720.0, 100.0),
        header("Level", 50.0, 710.0, 30.0),
        cell("1st", 50.0, 690.0, 15.0),
    ]]);

    let table = only_table(&doc);
    assert_eq!(table.header_row_count(), 4);
    assert_eq!(doc.diagnostics, vec![Diagnostic::UnexpectedHeaderRows { rows: 4 }]);
}

#[test]
fn test_custom_cell_gap() {
    let thresholds = Thresholds {
        cell_gap: 0.5,
        ..Thresholds::default()
    };
    let options = options().with_thresholds(thresholds);
    let pages = vec![vec![
        cell("d6", 50.0, 680.0, 10.0),
        cell("Trinket", 100.0, 680.0, 30.0),
        cell("box", 132.0, 680.0, 15.0),
    ]];

    // without a header, body fragments are plain text
    let doc = build_document(&pages, &options).unwrap();
    assert_eq!(doc.table_count(), 0);

    let mut table = TableBlock::new();
    for fragment in &pages[0] {
        table.feed(fragment, &options);
    }
    table.finish();
    assert_eq!(table.row_strings(), vec![vec!["d6", "Trinket", "box"]]);
}
