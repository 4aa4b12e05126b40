//! Flat-file persistence for harvested records.
//!
//! One CSV per record category plus the aggregate `inmates.csv`, all under a
//! single output directory with a `photos/` subdirectory beside them. Files
//! are append-only: the header row is written exactly once, when the file is
//! first created, and every detail row is prefixed with the owning
//! `inmate_id` column.
//!
//! There is no deduplication and no transactionality — a crash mid-write can
//! leave the last inmate's rows partially flushed. The aggregate file is a
//! streaming append per inmate, so summary rows already written survive a
//! crash later in the run.

pub mod csv;

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::types::{
    Appeal, BasicInfo, Classification, Detainer, Infraction, InmateDetail, InmateSummary,
    ParoleAction, Sentence, WorkProgram,
};

/// One flat file per detail-record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    BasicInfo,
    Sentences,
    Infractions,
    Appeals,
    Classifications,
    WorkPrograms,
    Detainers,
    ParoleActions,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::BasicInfo,
        Category::Sentences,
        Category::Infractions,
        Category::Appeals,
        Category::Classifications,
        Category::WorkPrograms,
        Category::Detainers,
        Category::ParoleActions,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Category::BasicInfo => "basic_info.csv",
            Category::Sentences => "sentences.csv",
            Category::Infractions => "infractions.csv",
            Category::Appeals => "appeals.csv",
            Category::Classifications => "classifications.csv",
            Category::WorkPrograms => "work_programs.csv",
            Category::Detainers => "detainers.csv",
            Category::ParoleActions => "parole_actions.csv",
        }
    }

    /// Field names for this category, without the `inmate_id` prefix column.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Category::BasicInfo => BasicInfo::FIELDS,
            Category::Sentences => Sentence::FIELDS,
            Category::Infractions => Infraction::FIELDS,
            Category::Appeals => Appeal::FIELDS,
            Category::Classifications => Classification::FIELDS,
            Category::WorkPrograms => WorkProgram::FIELDS,
            Category::Detainers => Detainer::FIELDS,
            Category::ParoleActions => ParoleAction::FIELDS,
        }
    }
}

/// Append-only CSV store rooted at one output directory.
pub struct CsvStore {
    output_dir: PathBuf,
    photos_dir: PathBuf,
}

impl CsvStore {
    /// Create the output directory and its `photos/` subdirectory if absent.
    pub fn new(output_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let output_dir = output_dir.into();
        let photos_dir = output_dir.join("photos");
        std::fs::create_dir_all(&photos_dir)?;
        Ok(Self {
            output_dir,
            photos_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    /// Target path for an inmate's captured photo.
    pub fn photo_path(&self, inmate_id: &str) -> PathBuf {
        self.photos_dir.join(format!("{}.jpg", inmate_id))
    }

    /// Stream one summary row into `inmates.csv` (header on first write).
    pub fn append_summary(&self, summary: &InmateSummary) -> io::Result<()> {
        self.append_file("inmates.csv", InmateSummary::HEADER, &[summary.to_row()])
    }

    /// Flush one inmate's detail record into the per-category files. Sections
    /// with no rows are skipped entirely — the category file is not touched.
    pub fn append_detail(&self, inmate_id: &str, detail: &InmateDetail) -> io::Result<()> {
        self.append_category(
            Category::BasicInfo,
            inmate_id,
            vec![detail.basic_info.to_row()],
        )?;
        self.append_category(
            Category::Sentences,
            inmate_id,
            detail.sentences.iter().map(Sentence::to_row).collect(),
        )?;
        self.append_category(
            Category::Infractions,
            inmate_id,
            detail.infractions.iter().map(Infraction::to_row).collect(),
        )?;
        self.append_category(
            Category::Appeals,
            inmate_id,
            detail.appeals.iter().map(Appeal::to_row).collect(),
        )?;
        self.append_category(
            Category::Classifications,
            inmate_id,
            detail
                .classifications
                .iter()
                .map(Classification::to_row)
                .collect(),
        )?;
        self.append_category(
            Category::WorkPrograms,
            inmate_id,
            detail
                .work_programs
                .iter()
                .map(WorkProgram::to_row)
                .collect(),
        )?;
        self.append_category(
            Category::Detainers,
            inmate_id,
            detail.detainers.iter().map(Detainer::to_row).collect(),
        )?;
        self.append_category(
            Category::ParoleActions,
            inmate_id,
            detail
                .parole_actions
                .iter()
                .map(ParoleAction::to_row)
                .collect(),
        )
    }

    /// Append rows to one category file, prefixing each with `inmate_id`.
    pub fn append_category(
        &self,
        category: Category,
        inmate_id: &str,
        rows: Vec<Vec<String>>,
    ) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut header = Vec::with_capacity(category.fields().len() + 1);
        header.push("inmate_id");
        header.extend_from_slice(category.fields());

        let prefixed: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| {
                let mut full = Vec::with_capacity(row.len() + 1);
                full.push(inmate_id.to_string());
                full.extend(row);
                full
            })
            .collect();
        self.append_file(category.file_name(), &header, &prefixed)
    }

    fn append_file(
        &self,
        file_name: &str,
        header: &[&str],
        rows: &[Vec<String>],
    ) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let path = self.output_dir.join(file_name);
        let write_header = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut w = BufWriter::new(file);
        if write_header {
            csv::write_row(&mut w, header)?;
        }
        for row in rows {
            csv::write_row(&mut w, row)?;
        }
        w.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str) -> InmateSummary {
        InmateSummary {
            inmate_id: id.to_string(),
            last_name: "SMITH".to_string(),
            first_name_middle_initial: "ADAM J".to_string(),
            admitted_date: "01/02/2020".to_string(),
            photo_filename: format!("{}.jpg", id),
        }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("out")).unwrap();

        store.append_summary(&summary("100001")).unwrap();
        store.append_summary(&summary("100002")).unwrap();

        let lines = read_lines(&store.output_dir().join("inmates.csv"));
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "inmate_id,last_name,first_name_middle_initial,admitted_date,photo_filename"
        );
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("inmate_id")).count(),
            1
        );
    }

    #[test]
    fn empty_category_append_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("out")).unwrap();

        store
            .append_category(Category::Sentences, "100001", Vec::new())
            .unwrap();
        assert!(!store.output_dir().join("sentences.csv").exists());
    }

    #[test]
    fn category_rows_are_prefixed_with_inmate_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("out")).unwrap();

        let detail = InmateDetail {
            infractions: vec![Infraction {
                violation_date: "03/04/2021".to_string(),
                infraction: "CONTRABAND".to_string(),
                verdict_date: "03/18/2021".to_string(),
                verdict: "GUILTY".to_string(),
            }],
            ..Default::default()
        };
        store.append_detail("100003", &detail).unwrap();

        let lines = read_lines(&store.output_dir().join("infractions.csv"));
        assert_eq!(
            lines[0],
            "inmate_id,violation_date,infraction,verdict_date,verdict"
        );
        assert_eq!(lines[1], "100003,03/04/2021,CONTRABAND,03/18/2021,GUILTY");

        // basic_info always lands, even when every field is empty
        let basic = read_lines(&store.output_dir().join("basic_info.csv"));
        assert_eq!(basic.len(), 2);
        assert!(basic[1].starts_with("100003,"));
    }

    #[test]
    fn photo_path_joins_id_with_jpg() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("out")).unwrap();
        assert!(store.photos_dir().is_dir());
        assert_eq!(
            store.photo_path("123456"),
            store.photos_dir().join("123456.jpg")
        );
    }
}
