use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};

/// Class label with the color its boxes are drawn in.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLabel {
    pub label: String,
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

/// Loads class labels from a `label,red,green,blue` file, one per line.
/// The line index is the model's class id.
pub fn load_class_labels(filepath: &Path) -> io::Result<Vec<ColorLabel>> {
    let file = File::open(filepath)?;
    parse_class_labels(io::BufReader::new(file))
}

fn parse_class_labels<R: BufRead>(reader: R) -> io::Result<Vec<ColorLabel>> {
    let mut color_labels = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        let parts: Vec<&str> = line.split(',').collect();

        if parts.len() != 4 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid line format: {}", line),
            ));
        }

        let label = parts[0].trim().to_string();
        let [red, green, blue] = [parts[1], parts[2], parts[3]].map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Invalid color value"))
        });

        color_labels.push(ColorLabel {
            label,
            red: red?,
            green: green?,
            blue: blue?,
        });
    }

    Ok(color_labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_valid_labels() {
        let input = "person, 255, 0, 0\nbicycle, 0, 255, 0\n";
        let labels = parse_class_labels(Cursor::new(input)).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(
            labels[0],
            ColorLabel {
                label: "person".to_string(),
                red: 255,
                green: 0,
                blue: 0,
            }
        );
        assert_eq!(labels[1].label, "bicycle");
    }

    #[test]
    fn test_rejects_short_line() {
        let input = "person, 255, 0\n";
        assert!(parse_class_labels(Cursor::new(input)).is_err());
    }

    #[test]
    fn test_rejects_bad_color_value() {
        let input = "person, 255, zero, 0\n";
        assert!(parse_class_labels(Cursor::new(input)).is_err());
    }
}
