use super::connection::ConnectionMatrix;
use super::pos::PosRole;
use super::DictError;

fn parse_dim(s: &str, what: &str) -> Result<u16, DictError> {
    s.parse()
        .map_err(|e| DictError::Parse(format!("invalid {what}: {e}")))
}

/// The square dimension from the header line: `N` or `N N`.
fn parse_header(header: &str) -> Result<u16, DictError> {
    match header.split_whitespace().collect::<Vec<_>>()[..] {
        [n] => parse_dim(n, "num_ids"),
        [left, right] => {
            let (nl, nr) = (parse_dim(left, "num_left")?, parse_dim(right, "num_right")?);
            if nl != nr {
                return Err(DictError::Parse(format!(
                    "num_left ({nl}) != num_right ({nr})"
                )));
            }
            Ok(nl)
        }
        ref parts => Err(DictError::Parse(format!(
            "expected 1 or 2 values in header, got {}",
            parts.len()
        ))),
    }
}

impl ConnectionMatrix {
    /// Parse a dense text matrix with no role metadata.
    ///
    /// The header is `N` (or `N N`), followed by `N * N` costs, one per line,
    /// in row-major `left_id` order. Blank lines are ignored.
    pub fn from_text(text: &str) -> Result<Self, DictError> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| DictError::Parse("empty file".to_string()))?;
        let num_ids = parse_header(header)?;
        let expected = num_ids as usize * num_ids as usize;

        let costs = lines
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.parse::<i16>()
                    .map_err(|e| DictError::Parse(format!("invalid cost '{line}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if costs.len() != expected {
            return Err(DictError::Parse(format!(
                "expected {expected} costs, got {}",
                costs.len()
            )));
        }

        Ok(Self {
            num_ids,
            fw_min: 0,
            fw_max: 0,
            roles: vec![PosRole::ContentWord.as_u8(); num_ids as usize],
            costs,
        })
    }

    /// Parse a dense text matrix and attach the function-word id range and
    /// a role byte per id.
    ///
    /// Ids past the end of `roles` are content words; more roles than ids is
    /// an error.
    pub fn from_text_with_roles(
        text: &str,
        fw_min: u16,
        fw_max: u16,
        mut roles: Vec<u8>,
    ) -> Result<Self, DictError> {
        let mut m = Self::from_text(text)?;
        if roles.len() > m.num_ids as usize {
            return Err(DictError::Parse(format!(
                "{} roles for {} ids",
                roles.len(),
                m.num_ids
            )));
        }
        roles.resize(m.num_ids as usize, PosRole::ContentWord.as_u8());
        m.fw_min = fw_min;
        m.fw_max = fw_max;
        m.roles = roles;
        Ok(m)
    }
}

/// Parse a role table: one `id role` pair per line (`1852 content`,
/// `268 function`, ...). Ids not listed default to content words.
///
/// Empty lines and lines starting with `#` are skipped.
pub fn parse_role_table(text: &str) -> Result<Vec<u8>, DictError> {
    let mut entries: Vec<(u16, PosRole)> = Vec::new();
    let mut max_id: Option<u16> = None;
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (id_str, role_str) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| DictError::InvalidLine {
                line: i + 1,
                reason: format!("expected `id role`, got {line:?}"),
            })?;
        let id: u16 = id_str.parse().map_err(|_| DictError::InvalidLine {
            line: i + 1,
            reason: format!("invalid id: {id_str}"),
        })?;
        let role: PosRole = role_str
            .trim()
            .parse()
            .map_err(|reason| DictError::InvalidLine {
                line: i + 1,
                reason,
            })?;
        max_id = Some(max_id.map_or(id, |m| m.max(id)));
        entries.push((id, role));
    }

    let mut roles = match max_id {
        Some(max) => vec![PosRole::ContentWord.as_u8(); max as usize + 1],
        None => Vec::new(),
    };
    for (id, role) in entries {
        roles[id as usize] = role.as_u8();
    }
    Ok(roles)
}
