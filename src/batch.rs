//! End-to-end extraction: path → bytes → tree → record.
//!
//! Every file runs through its own independent pipeline, so many workbooks
//! can be processed in parallel without coordination.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::archive;
use crate::common::detection::is_supported_workbook;
use crate::common::Result;
use crate::document::parse;
use crate::metrics::{self, MetricsRecord};

/// Extract the metrics of a `.twb` or `.twbx` file.
///
/// # Examples
///
/// ```no_run
/// let record = workbook_metrics::workbook_metrics("Superstore.twbx")?;
/// println!("{} dashboards, {} views", record.dashboards, record.views);
/// # Ok::<(), workbook_metrics::Error>(())
/// ```
pub fn workbook_metrics<P: AsRef<Path>>(path: P) -> Result<MetricsRecord> {
    let bytes = archive::load(path)?;
    metrics_from_bytes(&bytes)
}

/// Extract the metrics of workbook XML that is already in memory.
pub fn metrics_from_bytes(bytes: &[u8]) -> Result<MetricsRecord> {
    let doc = parse(bytes)?;
    Ok(metrics::extract(&doc))
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct FileMetrics {
    pub path: PathBuf,
    pub result: Result<MetricsRecord>,
}

/// Extract the metrics of many files in parallel.
///
/// Results come back in input order. A failing file is reported in its
/// entry and does not stop the others.
pub fn workbook_metrics_many<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<FileMetrics> {
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let result = workbook_metrics(path);
            match &result {
                Ok(_) => debug!("extracted metrics from {}", path.display()),
                Err(e) => warn!("failed to extract metrics from {}: {}", path.display(), e),
            }
            FileMetrics {
                path: path.to_path_buf(),
                result,
            }
        })
        .collect()
}

/// List the `.twb` and `.twbx` files directly inside a directory, sorted by path.
pub fn collect_workbook_paths<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable directory entry: {}", e);
                continue;
            },
        };
        let path = entry.path();
        if path.is_file() && is_supported_workbook(&path) {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const SAMPLE_WORKBOOK: &str = r#"<?xml version='1.0' encoding='utf-8' ?>
<workbook source-build='2024.1.0' version='18.1' xmlns:user='http://www.tableausoftware.com/xml/user'>
  <datasources>
    <datasource caption='Superstore' inline='true' name='federated.0hgpf0j1fdpvv316shikk0mmdlec' version='18.1'>
      <connection class='federated'>
        <relation connection='sqlserver.1' name='Custom SQL Query' type='text'>SELECT *&#13;&#10;FROM [Orders]</relation>
      </connection>
      <column caption='Profit Ratio' datatype='real' name='[Calculation_1]' role='measure' type='quantitative'>
        <calculation class='tableau' formula='SUM([Profit])&#13;&#10;/&#13;&#10;SUM([Sales])' />
      </column>
      <column datatype='string' name='[Region]' role='dimension' type='nominal' />
      <column datatype='real' name='[Sales]' role='measure' type='quantitative' />
    </datasource>
    <datasource hasconnection='false' inline='true' name='Parameters' version='18.1'>
      <column caption='Top N' datatype='integer' name='[Parameter 1]' param-domain-type='range' role='measure' type='quantitative' value='10'>
        <calculation class='tableau' formula='10' />
      </column>
    </datasource>
  </datasources>
  <worksheets>
    <worksheet name='Sales by Region' />
    <worksheet name='Profit Trend' />
    <worksheet name='Hidden Detail' />
  </worksheets>
  <dashboards>
    <dashboard name='Overview'>
      <zones>
        <zone h='100000' id='3' type-v2='layout-basic' w='100000' x='0' y='0'>
          <zone id='4' name='Sales by Region' />
          <zone id='5' name='Region' param='[federated.0hgpf0j1fdpvv316shikk0mmdlec].[none:Region:nk]' type='filter' />
          <zone id='6' name='Category' type='filter' />
        </zone>
      </zones>
    </dashboard>
  </dashboards>
</workbook>
"#;

    fn expected_sample_metrics() -> MetricsRecord {
        MetricsRecord {
            custom_sql: true,
            dashboards: 1,
            datasources: 1,
            views: 3,
            max_calc_len: 3,
            max_field_count: 3,
            max_quick_filter_count: 2,
        }
    }

    fn write_twbx(path: &Path, members: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, content) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_bare_and_packaged_give_same_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let twb = dir.path().join("Superstore.twb");
        let twbx = dir.path().join("Superstore.twbx");
        std::fs::write(&twb, SAMPLE_WORKBOOK).unwrap();
        write_twbx(
            &twbx,
            &[("Data/Superstore.hyper", "extract"), ("Superstore.twb", SAMPLE_WORKBOOK)],
        );

        assert_eq!(workbook_metrics(&twb).unwrap(), expected_sample_metrics());
        assert_eq!(workbook_metrics(&twbx).unwrap(), expected_sample_metrics());
    }

    #[test]
    fn test_metrics_from_bytes_is_deterministic() {
        let first = metrics_from_bytes(SAMPLE_WORKBOOK.as_bytes()).unwrap();
        let second = metrics_from_bytes(SAMPLE_WORKBOOK.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_packaged_workbook_without_document() {
        let dir = tempfile::tempdir().unwrap();
        let twbx = dir.path().join("empty.twbx");
        write_twbx(&twbx, &[("Image/logo.png", "png")]);

        assert!(matches!(workbook_metrics(&twbx), Err(Error::DocumentNotFound(_))));
    }

    #[test]
    fn test_malformed_document() {
        let result = metrics_from_bytes(b"<workbook><datasources>");
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.twb");
        let bad = dir.path().join("bad.twb");
        let other = dir.path().join("notes.txt");
        std::fs::write(&good, SAMPLE_WORKBOOK).unwrap();
        std::fs::write(&bad, "<workbook>").unwrap();
        std::fs::write(&other, "hello").unwrap();

        let results = workbook_metrics_many(&[&good, &bad, &other]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].path, good);
        assert_eq!(results[0].result.as_ref().unwrap(), &expected_sample_metrics());
        assert!(matches!(results[1].result, Err(Error::MalformedDocument(_))));
        assert!(matches!(results[2].result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_collect_workbook_paths() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.twbx", "a.twb", "c.tds", "readme.md"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.twb")).unwrap();

        let paths = collect_workbook_paths(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["a.twb", "b.twbx"]);
    }
}
