use blocksearch_core::db::open_db;
use blocksearch_core::{
    discover_documents, DocumentReader, IngestError, IngestService, JsonDocumentReader, Paragraph,
    ReadError, Run, StyleConfig,
};
use serde_json::json;
use std::path::Path;

fn write_dump(path: &Path, paragraphs: &[Paragraph]) {
    std::fs::write(path, serde_json::to_vec(paragraphs).unwrap()).unwrap();
}

fn card_dump(pocket: &str, tag: &str, author: &str) -> Vec<Paragraph> {
    vec![
        Paragraph::with_text("Heading1", pocket),
        Paragraph::with_text("Heading4", tag),
        Paragraph::new(None, vec![Run::styled(author, "Style13ptBold")]),
        Paragraph::body("evidence"),
    ]
}

#[test]
fn batch_skips_unreadable_documents_and_continues() {
    let input = tempfile::tempdir().unwrap();
    std::fs::create_dir(input.path().join("round1")).unwrap();
    write_dump(&input.path().join("a_aff.json"), &card_dump("Aff", "C1", "A"));
    std::fs::write(input.path().join("b_empty.json"), b"").unwrap();
    std::fs::write(input.path().join("c_broken.json"), b"[{").unwrap();
    write_dump(
        &input.path().join("round1").join("d_neg.json"),
        &card_dump("Neg", "C2", "B"),
    );
    std::fs::write(input.path().join("notes.txt"), b"ignored").unwrap();

    let db_dir = tempfile::tempdir().unwrap();
    let conn = open_db(db_dir.path().join("blockSearch.db")).unwrap();
    let reader = JsonDocumentReader;
    let paths = discover_documents(input.path(), reader.extension());
    assert_eq!(paths.len(), 4);

    let batch = IngestService::new(&conn, StyleConfig::default()).ingest_paths(&reader, &paths);

    assert_eq!(batch.ingested.len(), 2);
    assert_eq!(batch.skipped.len(), 2);
    assert_eq!(batch.card_count(), 2);
    assert!(matches!(
        batch.skipped[0].error,
        IngestError::Read(ReadError::Empty(_))
    ));
    assert!(matches!(
        batch.skipped[1].error,
        IngestError::Read(ReadError::Parse { .. })
    ));

    let documents: i64 = conn
        .query_row("SELECT COUNT(*) FROM Documents;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(documents, 2);
}

#[test]
fn rerunning_batch_on_same_directory_keeps_one_copy() {
    let input = tempfile::tempdir().unwrap();
    write_dump(&input.path().join("aff.json"), &card_dump("Aff", "C1", "A"));

    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("blockSearch.db");
    let reader = JsonDocumentReader;
    let paths = discover_documents(input.path(), reader.extension());

    for run in 0..2 {
        let conn = open_db(&db_path).unwrap();
        let batch =
            IngestService::new(&conn, StyleConfig::default()).ingest_paths(&reader, &paths);
        assert_eq!(batch.ingested.len(), 1);
        assert_eq!(batch.ingested[0].replaced_document_id.is_some(), run == 1);
    }

    let conn = open_db(&db_path).unwrap();
    for table in ["Documents", "Cards"] {
        let rows: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1, "{table}");
    }
}

#[test]
fn document_row_records_name_path_and_mtime() {
    let input = tempfile::tempdir().unwrap();
    let path = input.path().join("Aff Toolbox.json");
    std::fs::write(
        &path,
        serde_json::to_vec(&json!([
            {"style": "Heading1", "runs": [{"text": "Aff"}]},
            {"style": "Heading4", "runs": [{"text": "Claim"}]},
            {"runs": [{"text": "Smith 24", "style": "Style13ptBold"}, {"text": " rest"}]}
        ]))
        .unwrap(),
    )
    .unwrap();

    let db_dir = tempfile::tempdir().unwrap();
    let conn = open_db(db_dir.path().join("blockSearch.db")).unwrap();
    let report = IngestService::new(&conn, StyleConfig::default())
        .ingest_path(&JsonDocumentReader, &path)
        .unwrap();
    assert_eq!(report.rows.cards, 1);

    let (name, stored_path, modified): (String, String, i64) = conn
        .query_row(
            "SELECT FileName, FilePath, LastModified FROM Documents WHERE ID = ?1;",
            [report.document_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(name, "Aff Toolbox.json");
    assert_eq!(stored_path, path.to_str().unwrap());
    assert!(modified > 0);

    let author: String = conn
        .query_row("SELECT Author FROM Cards;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(author, "Smith 24");
}

#[test]
fn custom_styles_drive_classification() {
    let input = tempfile::tempdir().unwrap();
    let styles_path = input.path().join("styles.json");
    std::fs::write(
        &styles_path,
        br#"{"pocket": "Pocket", "hat": "Hat", "block": "Block", "tag": "Tag", "cite": "Cite"}"#,
    )
    .unwrap();
    let styles = StyleConfig::from_json_file(&styles_path).unwrap();

    let dump = input.path().join("custom.json");
    write_dump(
        &dump,
        &[
            Paragraph::with_text("Heading1", "not a pocket"),
            Paragraph::with_text("Pocket", "P"),
            Paragraph::with_text("Tag", "T"),
            Paragraph::new(None, vec![Run::styled("Author", "Cite")]),
        ],
    );

    let db_dir = tempfile::tempdir().unwrap();
    let conn = open_db(db_dir.path().join("blockSearch.db")).unwrap();
    let report = IngestService::new(&conn, styles)
        .ingest_path(&JsonDocumentReader, &dump)
        .unwrap();
    assert_eq!(report.rows.pockets, 1);
    assert_eq!(report.rows.cards, 1);
}
