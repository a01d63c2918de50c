use std::collections::BTreeMap;

pub const DEFAULT_DISPLAY_LENGTH: i64 = 10;
pub const MAX_DIRECTIVE_SLOTS: i64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than `desc` sorts ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    pub column_idx: i64,
    pub direction: SortDirection,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDirective {
    pub column_idx: i64,
    pub term: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub term: String,
    pub columns: Vec<FilterDirective>,
}

/// Leading-integer coercion: `"15px"` is 15, `"aaa"` is 0. Never fails.
pub fn coerce_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        value = value.saturating_mul(10).saturating_add(digit);
    }

    if negative {
        value.saturating_neg()
    } else {
        value
    }
}

pub fn coerce_flag(raw: &str) -> bool {
    let raw = raw.trim();
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

/// Typed view over the flat parameter bag a grid client sends.
///
/// Directive lists are parsed once on construction and again after `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    params: BTreeMap<String, String>,
    default_length: i64,
    max_slots: i64,
    sort: Vec<SortDirective>,
    filter: FilterRequest,
}

impl RequestParams {
    pub fn new<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_limits(params, DEFAULT_DISPLAY_LENGTH, MAX_DIRECTIVE_SLOTS)
    }

    pub fn with_limits<I, K, V>(params: I, default_length: i64, max_slots: i64) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = params
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        let mut request = Self {
            params,
            default_length,
            max_slots: max_slots.max(0),
            sort: Vec::new(),
            filter: FilterRequest::default(),
        };
        request.reparse();
        request
    }

    /// Builds from a JSON object; scalars are stringified and nulls skipped.
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self::new(json_pairs(value))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
        self.reparse();
    }

    pub fn echo_token(&self) -> i64 {
        self.get("sEcho").map(coerce_int).unwrap_or(0)
    }

    pub fn pagination_start(&self) -> i64 {
        self.get("iDisplayStart").map(coerce_int).unwrap_or(0)
    }

    pub fn pagination_length(&self) -> i64 {
        self.get("iDisplayLength")
            .map(coerce_int)
            .unwrap_or(self.default_length)
    }

    pub fn is_filter_requested(&self) -> bool {
        self.get("sSearch").is_some_and(|term| !term.is_empty())
    }

    pub fn sort_directives(&self) -> &[SortDirective] {
        &self.sort
    }

    pub fn filter_request(&self) -> &FilterRequest {
        &self.filter
    }

    fn slot_count(&self, key: &str) -> i64 {
        self.get(key)
            .map(coerce_int)
            .unwrap_or(1)
            .clamp(0, self.max_slots)
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(coerce_flag)
    }

    fn reparse(&mut self) {
        self.sort = self.parse_sort();
        self.filter = self.parse_filter();
    }

    fn parse_sort(&self) -> Vec<SortDirective> {
        (0..self.slot_count("iSortingCols"))
            .filter_map(|slot| {
                let column_idx = coerce_int(self.get(&format!("iSortCol_{slot}"))?);
                Some(SortDirective {
                    column_idx,
                    direction: SortDirection::parse(
                        self.get_or(&format!("sSortDir_{slot}"), "asc"),
                    ),
                    enabled: self.flag(&format!("bSortable_{column_idx}")),
                })
            })
            .collect()
    }

    fn parse_filter(&self) -> FilterRequest {
        let columns = (0..self.slot_count("iColumns"))
            .map(|column_idx| FilterDirective {
                column_idx,
                term: self.get_or(&format!("sSearch_{column_idx}"), "").to_string(),
                enabled: self.flag(&format!("bSearchable_{column_idx}")),
            })
            .collect();

        FilterRequest {
            term: self.get_or("sSearch", "").to_string(),
            columns,
        }
    }
}

fn json_pairs(value: &serde_json::Value) -> Vec<(String, String)> {
    let Some(object) = value.as_object() else {
        return Vec::new();
    };

    object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(text) => text.clone(),
                serde_json::Value::Bool(flag) => flag.to_string(),
                serde_json::Value::Number(number) => number.to_string(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}
