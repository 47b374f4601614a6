use pointclouds_core::PointCloud;
use std::fs;
use std::io;
use std::path::Path;

/// Reads a plain-text XYZ table: one `x y z` triple per row.
///
/// Columns may be separated by whitespace and/or commas. Blank lines and
/// lines starting with `#` are skipped. Values are parsed as `f64` and
/// stored as `f32`.
pub fn read_xyz(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let text = fs::read_to_string(path)?;
    parse_xyz(&text)
}

/// Parses XYZ text already held in memory. See [`read_xyz`].
pub fn parse_xyz(text: &str) -> io::Result<PointCloud> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .collect();

        if fields.len() != 3 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "line {}: expected 3 columns, found {}",
                    line_no + 1,
                    fields.len()
                ),
            ));
        }

        let mut row = [0.0f64; 3];
        for (slot, field) in row.iter_mut().zip(&fields) {
            *slot = field.parse::<f64>().map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line {}: invalid number {:?}: {}", line_no + 1, field, e),
                )
            })?;
        }

        x.push(row[0] as f32);
        y.push(row[1] as f32);
        z.push(row[2] as f32);
    }

    Ok(PointCloud::from_xyz(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_whitespace_separated_rows() {
        let cloud = parse_xyz("1 2 3\n4.5\t5.5   6.5\n").unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(0), [1.0, 2.0, 3.0]);
        assert_eq!(cloud.point(1), [4.5, 5.5, 6.5]);
    }

    #[test]
    fn parses_comma_separated_rows() {
        let cloud = parse_xyz("1,2,3\n-1, -2, -3\n").unwrap();
        assert_eq!(cloud.point(1), [-1.0, -2.0, -3.0]);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let cloud = parse_xyz("# scan 1\n\n0 0 1\n   \n# end\n").unwrap();
        assert_eq!(cloud.len(), 1);
    }

    #[test]
    fn accepts_scientific_notation() {
        let cloud = parse_xyz("5e-1 2E2 -3.5e+1\n").unwrap();
        assert_eq!(cloud.point(0), [0.5, 200.0, -35.0]);
    }

    #[test]
    fn empty_input_gives_empty_cloud() {
        assert!(parse_xyz("").unwrap().is_empty());
    }

    #[test]
    fn rejects_wrong_column_count() {
        let err = parse_xyz("1 2 3\n1 2\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("line 2"), "{}", err);

        let err = parse_xyz("1 2 3 4\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_non_numeric_field() {
        let err = parse_xyz("1 two 3\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("two"), "{}", err);
    }

    #[test]
    fn read_xyz_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "0.5 0.5 0.5").unwrap();
        writeln!(tmp, "10 20 30").unwrap();
        let cloud = read_xyz(tmp.path()).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(1), [10.0, 20.0, 30.0]);
    }

    #[test]
    fn read_xyz_missing_file() {
        let err = read_xyz("/nonexistent/definitely/missing.xyz").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
