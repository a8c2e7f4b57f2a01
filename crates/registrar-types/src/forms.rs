use serde::Deserialize;

use crate::models::SubjectMark;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub role: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub reg_no: String,
    #[serde(default = "default_stream")]
    pub stream: String,
    #[serde(default = "default_sub_stream")]
    pub sub_stream: String,
}

fn default_stream() -> String {
    "B.Tech(CSE)".to_string()
}

fn default_sub_stream() -> String {
    "NA".to_string()
}

/// The fixed 6-row record editor form. Attendance and cgpa arrive as raw
/// strings and are validated by the handler.
#[derive(Debug, Deserialize)]
pub struct EditStudentForm {
    pub attendance: String,
    pub cgpa: String,
    #[serde(default)]
    pub subject_code_1: Option<String>,
    #[serde(default)]
    pub score_1: Option<String>,
    #[serde(default)]
    pub subject_code_2: Option<String>,
    #[serde(default)]
    pub score_2: Option<String>,
    #[serde(default)]
    pub subject_code_3: Option<String>,
    #[serde(default)]
    pub score_3: Option<String>,
    #[serde(default)]
    pub subject_code_4: Option<String>,
    #[serde(default)]
    pub score_4: Option<String>,
    #[serde(default)]
    pub subject_code_5: Option<String>,
    #[serde(default)]
    pub score_5: Option<String>,
    #[serde(default)]
    pub subject_code_6: Option<String>,
    #[serde(default)]
    pub score_6: Option<String>,
}

impl EditStudentForm {
    fn rows(&self) -> [(&Option<String>, &Option<String>); 6] {
        [
            (&self.subject_code_1, &self.score_1),
            (&self.subject_code_2, &self.score_2),
            (&self.subject_code_3, &self.score_3),
            (&self.subject_code_4, &self.score_4),
            (&self.subject_code_5, &self.score_5),
            (&self.subject_code_6, &self.score_6),
        ]
    }

    /// Collect the marks in form order, keeping only rows where both the
    /// code and the score were filled in.
    pub fn marks(&self) -> Vec<SubjectMark> {
        self.rows()
            .into_iter()
            .filter_map(|(code, score)| match (code, score) {
                (Some(code), Some(score)) if !code.is_empty() && !score.is_empty() => {
                    Some(SubjectMark {
                        code: code.clone(),
                        score: score.clone(),
                    })
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_form() -> EditStudentForm {
        EditStudentForm {
            attendance: "0".into(),
            cgpa: "0.0".into(),
            subject_code_1: None,
            score_1: None,
            subject_code_2: None,
            score_2: None,
            subject_code_3: None,
            score_3: None,
            subject_code_4: None,
            score_4: None,
            subject_code_5: None,
            score_5: None,
            subject_code_6: None,
            score_6: None,
        }
    }

    #[test]
    fn marks_drop_rows_missing_either_field() {
        let mut form = blank_form();
        form.subject_code_1 = Some("CS101".into());
        form.score_1 = Some("80".into());
        form.subject_code_2 = Some("CS102".into());
        form.score_2 = Some("".into());
        form.score_3 = Some("55".into());

        let marks = form.marks();
        assert_eq!(
            marks,
            vec![SubjectMark {
                code: "CS101".into(),
                score: "80".into()
            }]
        );
    }

    #[test]
    fn marks_follow_form_position_order() {
        let mut form = blank_form();
        form.subject_code_6 = Some("CS106".into());
        form.score_6 = Some("60".into());
        form.subject_code_2 = Some("CS102".into());
        form.score_2 = Some("70".into());

        let marks = form.marks();
        let codes: Vec<&str> = marks.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["CS102", "CS106"]);
    }
}
