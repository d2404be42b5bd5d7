//! Built-in form templates and completion of saved data against them.

use crate::model::{ExtractedData, Section};

/// Section and field layout of one form type.
#[derive(Debug)]
pub struct Template {
    pub name: &'static str,
    pub sections: &'static [(&'static str, &'static [&'static str])],
}

pub const BIODATA: Template = Template {
    name: "Biodata",
    sections: &[
        ("Personal Information", &["Full Name", "Date of Birth", "Gender"]),
        ("Contact Details", &["Address", "City", "Phone Number", "Email Address"]),
        (
            "Family Information",
            &["Father's Name", "Father's Occupation", "Mother's Name", "Mother's Occupation"],
        ),
        (
            "Educational Background",
            &["Highest Qualification", "Institution Name", "Year of Passing", "Percentage"],
        ),
        (
            "Professional Details",
            &["Current Occupation", "Company Name", "Work Experience (years)", "Key Skills"],
        ),
        ("Miscellaneous", &["Hobby", "Languages Known"]),
    ],
};

pub const ADMISSION: Template = Template {
    name: "Admission",
    sections: &[
        ("Personal Details", &["Full Name", "Date of Birth", "Gender"]),
        ("Educational Details", &["School", "Percentage"]),
        (
            "Contact Information",
            &["Address", "City", "State", "Postal Code", "Phone Number", "Email Address"],
        ),
        ("Course Details", &["Course Applied For", "Preferred Stream"]),
    ],
};

pub const BANK_ACCOUNT: Template = Template {
    name: "Bank Account",
    sections: &[
        ("Bank Details", &["Bank Name", "Branch", "Form Type", "Date", "Type of Account"]),
        (
            "Personal Details",
            &[
                "Full Name",
                "Date of Birth",
                "Gender",
                "Nationality",
                "Marital Status",
                "Occupation",
                "Monthly Income (approx.)",
            ],
        ),
        (
            "Contact Information",
            &["Address", "City", "State", "Postal Code", "Phone Number", "Email Address"],
        ),
    ],
};

pub static BUILTIN_TEMPLATES: [&Template; 3] = [&BIODATA, &ADMISSION, &BANK_ACCOUNT];

/// Exact name match first, then case-insensitive.
pub fn find(template_type: &str) -> Option<&'static Template> {
    let wanted = template_type.trim();
    BUILTIN_TEMPLATES
        .iter()
        .find(|t| t.name == wanted)
        .or_else(|| {
            BUILTIN_TEMPLATES
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(wanted))
        })
        .copied()
}

impl Template {
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|(_, fields)| fields.len()).sum()
    }

    /// Every template section and field in template order, saved values
    /// overlaid. Fields and sections the template does not know keep their
    /// saved order after the template's own.
    pub fn complete(&self, saved: &ExtractedData) -> ExtractedData {
        let mut out = ExtractedData::new();
        for (section_name, fields) in self.sections {
            let mut section = Section::new(*section_name);
            let stored = saved.section(section_name);
            for field in *fields {
                let value = stored.and_then(|s| s.get(field)).unwrap_or_default();
                section.insert(*field, value);
            }
            if let Some(stored) = stored {
                let extras = stored
                    .fields
                    .iter()
                    .filter(|f| !fields.contains(&f.name.as_str()));
                for extra in extras {
                    section.insert(extra.name.as_str(), extra.value.as_str());
                }
            }
            out.insert_section(section);
        }

        for extra in saved
            .sections()
            .iter()
            .filter(|s| !self.sections.iter().any(|(name, _)| *name == s.name))
        {
            log::debug!("section {:?} is not part of template {:?}", extra.name, self.name);
            out.insert_section(extra.clone());
        }
        out
    }
}

/// Complete `saved` against the built-in template named `template_type`.
/// Unknown template types leave the data unchanged.
pub fn complete_with_template(template_type: &str, saved: &ExtractedData) -> ExtractedData {
    match find(template_type) {
        Some(template) => template.complete(saved),
        None => {
            log::debug!("no built-in template {template_type:?}; data used as saved");
            saved.clone()
        }
    }
}
