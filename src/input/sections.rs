use std::fmt;

/// Section width leaves no room for text once markers are subtracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    InvalidConfiguration {
        width: usize,
        left: usize,
        right: usize,
    },
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { width, left, right } => write!(
                f,
                "section width {width} leaves no room for text with markers of {left} and {right} characters"
            ),
        }
    }
}

impl std::error::Error for SectionError {}

/// One visible slice of an over-long input line. `start..end` are char offsets
/// into the logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySection {
    pub text: String,
    pub left_marker: Option<String>,
    pub right_marker: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl DisplaySection {
    pub fn display_text(&self) -> String {
        let mut out = String::new();
        if let Some(marker) = &self.left_marker {
            out.push_str(marker);
        }
        out.push_str(&self.text);
        if let Some(marker) = &self.right_marker {
            out.push_str(marker);
        }
        out
    }

    pub fn left_marker_len(&self) -> usize {
        self.left_marker
            .as_deref()
            .map_or(0, |marker| marker.chars().count())
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

/// A logical line split into fixed-width sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSections {
    sections: Vec<DisplaySection>,
}

impl LineSections {
    pub fn build(
        line: &str,
        width: usize,
        left_marker: &str,
        right_marker: &str,
    ) -> Result<Self, SectionError> {
        let left = left_marker.chars().count();
        let right = right_marker.chars().count();
        let step = width
            .checked_sub(left + right)
            .filter(|step| *step > 0)
            .ok_or(SectionError::InvalidConfiguration { width, left, right })?;

        let chars: Vec<char> = line.chars().collect();
        let mut sections = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let has_left = start > 0;
            let usable = if has_left { width - left } else { width };
            let remaining = chars.len() - start;
            let (end, has_right) = if remaining <= usable {
                (chars.len(), false)
            } else if has_left {
                (start + step, true)
            } else {
                (start + width - right, true)
            };
            sections.push(DisplaySection {
                text: chars[start..end].iter().collect(),
                left_marker: has_left.then(|| left_marker.to_string()),
                right_marker: has_right.then(|| right_marker.to_string()),
                start,
                end,
            });
            start = end;
        }
        Ok(Self { sections })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DisplaySection> {
        self.sections.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplaySection> {
        self.sections.iter()
    }

    /// The last section starting at or before `index`; indices past the end
    /// land in the final section.
    pub fn locate_section(&self, index: usize) -> Option<(usize, &DisplaySection)> {
        let position = self
            .sections
            .iter()
            .rposition(|section| section.start <= index)
            .unwrap_or(0);
        self.sections.get(position).map(|section| (position, section))
    }

    /// Column of `index` within the section's displayed text.
    pub fn relative_index(section: &DisplaySection, index: usize) -> usize {
        index.saturating_sub(section.start) + section.left_marker_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(sections: &LineSections) -> Vec<String> {
        sections.iter().map(DisplaySection::display_text).collect()
    }

    #[test]
    fn splits_without_markers() {
        let sections = LineSections::build("test string", 2, "", "").expect("valid");
        assert_eq!(display(&sections), vec!["te", "st", " s", "tr", "in", "g"]);
    }

    #[test]
    fn splits_with_markers() {
        let sections = LineSections::build("test string", 5, ".", "..").expect("valid");
        assert_eq!(
            display(&sections),
            vec!["tes..", ".t ..", ".st..", ".ring"]
        );
        let first = sections.get(0).expect("first");
        assert!(first.left_marker.is_none());
        let last = sections.get(sections.len() - 1).expect("last");
        assert!(last.right_marker.is_none());
    }

    #[test]
    fn rejects_width_consumed_by_markers() {
        assert_eq!(
            LineSections::build("test string", 2, ".", "."),
            Err(SectionError::InvalidConfiguration {
                width: 2,
                left: 1,
                right: 1
            })
        );
        assert!(LineSections::build("abc", 0, "", "").is_err());
        assert!(LineSections::build("", 3, "...", "...").is_err());
    }

    #[test]
    fn sections_reconstruct_line() {
        let line = "the quick brown fox jumps over the lazy dog";
        for width in 7..20 {
            let sections = LineSections::build(line, width, "...", "...").expect("valid");
            let joined: String = sections.iter().map(|s| s.text.as_str()).collect();
            assert_eq!(joined, line);
            for section in sections.iter() {
                assert!(section.display_text().chars().count() <= width);
            }
            let mut expected_start = 0;
            for section in sections.iter() {
                assert_eq!(section.start, expected_start);
                expected_start = section.end;
            }
            assert_eq!(expected_start, line.chars().count());
        }
    }

    #[test]
    fn counts_chars_not_bytes() {
        let sections = LineSections::build("ééééé", 2, "", "").expect("valid");
        assert_eq!(display(&sections), vec!["éé", "éé", "é"]);
    }

    #[test]
    fn every_index_maps_to_one_section() {
        let line = "test string";
        let sections = LineSections::build(line, 5, ".", "..").expect("valid");
        for index in 0..=line.len() {
            let (position, section) = sections.locate_section(index).expect("section");
            let relative = LineSections::relative_index(section, index);
            if index < line.len() {
                assert!(section.contains(index), "index {index} in section {position}");
            } else {
                assert_eq!(position, sections.len() - 1);
            }
            assert!(relative <= section.display_text().chars().count());
        }
    }

    #[test]
    fn section_start_maps_to_marker_offset() {
        let sections = LineSections::build("test string", 5, ".", "..").expect("valid");
        for (position, section) in sections.iter().enumerate() {
            let relative = LineSections::relative_index(section, section.start);
            if position == 0 {
                assert_eq!(relative, 0);
            } else {
                assert_eq!(relative, 1);
            }
        }
    }

    #[test]
    fn locate_clamps_past_end() {
        let sections = LineSections::build("abcdef", 3, "", "").expect("valid");
        let (position, _) = sections.locate_section(100).expect("section");
        assert_eq!(position, 1);
        assert!(LineSections::build("", 3, "", "")
            .expect("valid")
            .locate_section(0)
            .is_none());
    }
}
