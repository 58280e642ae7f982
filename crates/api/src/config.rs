use crate::auth::AuthTokens;
use types::TeacherId;

/// Environment-only configuration, `TIMETABLE__SECTION__KEY` naming.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub auth: AuthTokens,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("TIMETABLE__SERVER__PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let admin = std::env::var("TIMETABLE__AUTH__ADMIN_TOKEN").ok();
        let student = std::env::var("TIMETABLE__AUTH__STUDENT_TOKEN").ok();
        // "token=teacherId,token=teacherId"
        let teachers = std::env::var("TIMETABLE__AUTH__TEACHER_TOKENS")
            .ok()
            .map(|raw| parse_teacher_tokens(&raw))
            .unwrap_or_default();

        Self {
            port,
            auth: AuthTokens::new(admin, teachers, student),
        }
    }
}

fn parse_teacher_tokens(raw: &str) -> Vec<(String, TeacherId)> {
    raw.split(',')
        .filter_map(|pair| {
            let (token, id) = pair.split_once('=')?;
            let (token, id) = (token.trim(), id.trim());
            if token.is_empty() || id.is_empty() {
                return None;
            }
            Some((token.to_string(), TeacherId(id.to_string())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teacher_token_list() {
        let parsed = parse_teacher_tokens("abc=t1, def=t2 ,broken,=t3");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, "abc");
        assert_eq!(parsed[1].1, TeacherId("t2".into()));
    }
}
