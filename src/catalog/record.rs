//! Flattening of linked leaf codes into persistable rows

use crate::catalog::entry::Disease;
use crate::LinkageError;

/// One row of the `medical_codes` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalCode {
    /// Name of the top-level category the code falls under
    pub group_code: String,
    pub group_desc: String,
    pub code: String,
    pub code_desc: String,
}

impl TryFrom<&Disease> for MedicalCode {
    type Error = LinkageError;

    fn try_from(disease: &Disease) -> Result<Self, Self::Error> {
        let missing = |missing| LinkageError {
            code: disease.entry.name.clone(),
            missing,
        };

        let subcategory = disease.subcategory().ok_or_else(|| missing("subcategory"))?;
        let category = subcategory.category().ok_or_else(|| missing("category"))?;

        Ok(Self {
            group_code: category.entry.name.clone(),
            group_desc: category.entry.description.clone(),
            code: disease.entry.name.clone(),
            code_desc: disease.entry.description.clone(),
        })
    }
}

/// Projects leaf codes into rows, one per code, in input order
///
/// A code whose back-reference chain is broken is a walker defect and fails
/// the whole batch rather than being skipped.
pub fn flatten(diseases: &[Disease]) -> Result<Vec<MedicalCode>, LinkageError> {
    diseases.iter().map(MedicalCode::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry::{Category, Entry, SubCategory};
    use std::sync::Arc;

    fn category(name: &str, description: &str) -> Arc<Category> {
        Arc::new(Category::new(Entry::new(name, Some(format!("/{}", name)), description)))
    }

    #[test]
    fn test_flatten_uses_grandparent_category() {
        let category = category("A00-A09", "Intestinal infectious diseases");
        let subcategory = Arc::new(SubCategory::new(
            Entry::new("A04", Some("/A04".to_string()), "Other bacterial intestinal infections"),
            &category,
        ));
        let diseases = vec![
            Disease::new(
                Entry::new("A04.0", None, "Enteropathogenic Escherichia coli infection"),
                &subcategory,
            ),
            Disease::new(
                Entry::new("A04.1", None, "Enterotoxigenic Escherichia coli infection"),
                &subcategory,
            ),
        ];

        let records = flatten(&diseases).unwrap();

        assert_eq!(records.len(), diseases.len());
        assert_eq!(
            records[0],
            MedicalCode {
                group_code: "A00-A09".to_string(),
                group_desc: "Intestinal infectious diseases".to_string(),
                code: "A04.0".to_string(),
                code_desc: "Enteropathogenic Escherichia coli infection".to_string(),
            }
        );
        assert_eq!(records[1].code, "A04.1");
        for (record, disease) in records.iter().zip(&diseases) {
            let expected = disease.subcategory().unwrap().category().unwrap();
            assert_eq!(record.group_code, expected.entry.name);
        }
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_subcategory() {
        let diseases = vec![Disease::detached(Entry::new("B15.9", None, "Hepatitis A"))];

        let err = flatten(&diseases).unwrap_err();
        assert_eq!(err.code, "B15.9");
        assert_eq!(err.missing, "subcategory");
    }

    #[test]
    fn test_missing_category() {
        let subcategory = Arc::new(SubCategory::detached(Entry::new(
            "B15",
            Some("/B15".to_string()),
            "Acute hepatitis A",
        )));
        let diseases = vec![Disease::new(Entry::new("B15.9", None, "Hepatitis A"), &subcategory)];

        let err = flatten(&diseases).unwrap_err();
        assert_eq!(err.missing, "category");
    }

    #[test]
    fn test_one_broken_link_fails_the_batch() {
        let category = category("B15-B19", "Viral hepatitis");
        let subcategory = Arc::new(SubCategory::new(
            Entry::new("B15", Some("/B15".to_string()), "Acute hepatitis A"),
            &category,
        ));
        let diseases = vec![
            Disease::new(Entry::new("B15.0", None, "Hepatitis A with hepatic coma"), &subcategory),
            Disease::detached(Entry::new("B15.9", None, "Hepatitis A without hepatic coma")),
        ];

        assert!(flatten(&diseases).is_err());
    }
}
