/// Keyword extraction from ExifTool output
///
/// Two shapes of output are handled here:
/// - the structured `-j -G` JSON with `EXIF:XPKeywords` / `IPTC:Keywords`
/// - the plain `Key : Value` listing used when the structured value is lossy

use serde_json::Value;

use super::encoding;
use crate::error::MetadataError;

/// ExifTool group-qualified name of the Windows keyword field
pub const XP_KEYWORDS: &str = "EXIF:XPKeywords";
/// ExifTool group-qualified name of the general keyword field
pub const IPTC_KEYWORDS: &str = "IPTC:Keywords";

/// Value of a keyword field as ExifTool reports it
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

/// The two fields the reader looks at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordFields {
    pub xp_keywords: Option<String>,
    pub iptc_keywords: Option<FieldValue>,
}

/// Outcome of applying the field precedence rules
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Tags decoded from the structured fields
    Tags(Vec<String>),
    /// The structured value is lossy, the plain listing must be parsed
    NeedsFallback,
}

impl KeywordFields {
    /// Parse the JSON array printed by `exiftool -j -G`
    pub fn from_json(output: &str) -> Result<Self, MetadataError> {
        let parsed: Value = serde_json::from_str(output)
            .map_err(|e| MetadataError::InvalidOutput(e.to_string()))?;

        let record = match parsed {
            Value::Array(mut records) if !records.is_empty() => records.swap_remove(0),
            Value::Array(_) => return Ok(Self::default()),
            other => {
                return Err(MetadataError::InvalidOutput(format!(
                    "expected a JSON array, got {}",
                    other
                )))
            }
        };

        let xp_keywords = match record.get(XP_KEYWORDS) {
            Some(value) => scalar_text(value),
            None => None,
        };

        let iptc_keywords = match record.get(IPTC_KEYWORDS) {
            Some(Value::Array(items)) => {
                let items = items
                    .iter()
                    .map(|item| {
                        scalar_text(item).ok_or_else(|| {
                            MetadataError::InvalidOutput(format!("non-text keyword entry: {}", item))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Some(FieldValue::List(items))
            }
            Some(value) => scalar_text(value).map(FieldValue::Single),
            None => None,
        };

        Ok(Self {
            xp_keywords,
            iptc_keywords,
        })
    }

    /// Decide which field wins and decode it.
    ///
    /// 1. a non-empty XP string, split on `;`
    /// 2. an IPTC list without the marker, entry by entry
    /// 3. any IPTC value with the marker goes to the plain listing
    /// 4. an IPTC string without the marker, split on `;`
    /// 5. nothing
    pub fn resolve(&self) -> Resolution {
        if let Some(xp) = self.xp_keywords.as_deref().filter(|s| !s.is_empty()) {
            return Resolution::Tags(split_repaired(xp));
        }

        match &self.iptc_keywords {
            Some(FieldValue::List(items)) => {
                if items.iter().any(|s| encoding::has_marker(s)) {
                    Resolution::NeedsFallback
                } else {
                    Resolution::Tags(items.iter().map(|s| encoding::repair(s)).collect())
                }
            }
            Some(FieldValue::Single(text)) if encoding::has_marker(text) => {
                Resolution::NeedsFallback
            }
            Some(FieldValue::Single(text)) => Resolution::Tags(split_repaired(text)),
            None => Resolution::Tags(Vec::new()),
        }
    }
}

/// Strings stay strings, numeric keywords ("2019") become their text
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn split_repaired(text: &str) -> Vec<String> {
    encoding::repair(text)
        .split(';')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Pull the tags out of a plain ExifTool listing.
///
/// The first line whose key mentions `Keyword` wins; its value is split on
/// commas and trimmed.
pub fn parse_listing(output: &str) -> Vec<String> {
    for line in output.lines() {
        let Some((key, value)) = line.split_once(": ") else {
            continue;
        };
        if key.contains("Keyword") {
            return value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1251;

    fn garble(original: &str) -> String {
        WINDOWS_1251
            .decode_without_bom_handling(original.as_bytes())
            .0
            .into_owned()
    }

    fn list(items: &[&str]) -> Option<FieldValue> {
        Some(FieldValue::List(items.iter().map(|s| s.to_string()).collect()))
    }

    #[test]
    fn test_xp_keywords_take_precedence() {
        let fields = KeywordFields {
            xp_keywords: Some(garble("кот;собака")),
            iptc_keywords: list(&["ignored", "also ignored"]),
        };
        assert_eq!(
            fields.resolve(),
            Resolution::Tags(vec!["кот".to_string(), "собака".to_string()])
        );

        // Even a lossy IPTC value does not matter when XP is present
        let fields = KeywordFields {
            xp_keywords: Some("sea;sun".to_string()),
            iptc_keywords: Some(FieldValue::Single("???".to_string())),
        };
        assert_eq!(
            fields.resolve(),
            Resolution::Tags(vec!["sea".to_string(), "sun".to_string()])
        );
    }

    #[test]
    fn test_empty_xp_falls_through() {
        let fields = KeywordFields {
            xp_keywords: Some(String::new()),
            iptc_keywords: list(&["beach"]),
        };
        assert_eq!(fields.resolve(), Resolution::Tags(vec!["beach".to_string()]));
    }

    #[test]
    fn test_iptc_list_keeps_length_and_order() {
        let fields = KeywordFields {
            xp_keywords: None,
            iptc_keywords: Some(FieldValue::List(vec![
                garble("широко"),
                "novo".to_string(),
                garble("зима"),
            ])),
        };
        assert_eq!(
            fields.resolve(),
            Resolution::Tags(vec![
                "широко".to_string(),
                "novo".to_string(),
                "зима".to_string()
            ])
        );
    }

    #[test]
    fn test_marker_requires_fallback() {
        let fields = KeywordFields {
            xp_keywords: None,
            iptc_keywords: list(&["fine", "??????"]),
        };
        assert_eq!(fields.resolve(), Resolution::NeedsFallback);

        let fields = KeywordFields {
            xp_keywords: None,
            iptc_keywords: Some(FieldValue::Single("???;ok".to_string())),
        };
        assert_eq!(fields.resolve(), Resolution::NeedsFallback);
    }

    #[test]
    fn test_iptc_string_splits_on_semicolon() {
        let fields = KeywordFields {
            xp_keywords: None,
            iptc_keywords: Some(FieldValue::Single(garble("лето;море"))),
        };
        assert_eq!(
            fields.resolve(),
            Resolution::Tags(vec!["лето".to_string(), "море".to_string()])
        );
    }

    #[test]
    fn test_no_fields_means_no_tags() {
        assert_eq!(KeywordFields::default().resolve(), Resolution::Tags(Vec::new()));
    }

    #[test]
    fn test_from_json_shapes() {
        let json = r#"[{"SourceFile":"a.jpg","EXIF:XPKeywords":"a;b","IPTC:Keywords":["x",2019]}]"#;
        let fields = KeywordFields::from_json(json).unwrap();
        assert_eq!(fields.xp_keywords.as_deref(), Some("a;b"));
        assert_eq!(fields.iptc_keywords, list(&["x", "2019"]));

        let json = r#"[{"SourceFile":"a.jpg","IPTC:Keywords":"solo"}]"#;
        let fields = KeywordFields::from_json(json).unwrap();
        assert_eq!(fields.xp_keywords, None);
        assert_eq!(fields.iptc_keywords, Some(FieldValue::Single("solo".to_string())));

        let fields = KeywordFields::from_json(r#"[{"SourceFile":"a.jpg"}]"#).unwrap();
        assert_eq!(fields, KeywordFields::default());

        assert!(KeywordFields::from_json("not json").is_err());
        assert!(KeywordFields::from_json(r#"{"SourceFile":"a.jpg"}"#).is_err());
    }

    #[test]
    fn test_non_text_list_entries_are_invalid() {
        // Dropping the entry would shrink the list and lose a keyword on the next write
        for json in [
            r#"[{"IPTC:Keywords":["a",null]}]"#,
            r#"[{"IPTC:Keywords":["a",{"b":1}]}]"#,
        ] {
            assert!(matches!(
                KeywordFields::from_json(json),
                Err(MetadataError::InvalidOutput(_))
            ));
        }
    }

    #[test]
    fn test_parse_listing_takes_first_keyword_line() {
        let output = "\
ExifTool Version Number         : 12.76
File Name                       : 007.jpg
Keywords                        : кот, собака ,  дом
XP Keywords                     : other
";
        assert_eq!(
            parse_listing(output),
            vec!["кот".to_string(), "собака".to_string(), "дом".to_string()]
        );
    }

    #[test]
    fn test_parse_listing_without_keywords() {
        assert!(parse_listing("File Name : a.jpg\nImage Size : 10x10\n").is_empty());
        assert!(parse_listing("").is_empty());
    }
}
