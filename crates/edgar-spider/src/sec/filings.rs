use crate::ParseError;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// Where relative `filingHref` paths live.
pub const SEC_BASE_URL: &str = "https://www.sec.gov";

/// One filing reference for a company, as stored in `insider_trades`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::FromRow, utoipa::ToSchema)]
#[schema(example = json!({
    "id": 1,
    "cik": "0000320193",
    "transaction_date": "2024-01-05",
    "form_type": "4",
    "filing_url": "https://www.sec.gov/Archives/edgar/data/320193/000032019324000001-index.htm"
}))]
pub struct InsiderTransaction {
    /// Row id; `None` until the filing has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub cik: String,
    /// Provider date text, kept verbatim (ISO-like, so it sorts as a string).
    pub transaction_date: String,
    pub form_type: String,
    /// Always absolute.
    pub filing_url: String,
}

impl InsiderTransaction {
    pub fn new(
        cik: impl Into<String>,
        transaction_date: impl Into<String>,
        form_type: impl Into<String>,
        filing_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            cik: cik.into(),
            transaction_date: transaction_date.into(),
            form_type: form_type.into(),
            filing_url: filing_url.into(),
        }
    }
}

/// Parse the `browse-edgar` XML listing for `cik`, joining links onto [`SEC_BASE_URL`].
pub fn parse_insider_filings(xml: &str, cik: &str) -> Result<Vec<InsiderTransaction>, ParseError> {
    parse_insider_filings_with_base(xml, cik, SEC_BASE_URL)
}

/// Every `<filing>` element becomes one transaction; each needs `dateFiled`, `type` and
/// `filingHref` children.
pub fn parse_insider_filings_with_base(
    xml: &str,
    cik: &str,
    base: &str,
) -> Result<Vec<InsiderTransaction>, ParseError> {
    read_filings(Reader::from_str(xml), cik, base)
}

/// Raw upstream body; text is decoded with the encoding its XML declaration names
/// (EDGAR declares `ISO-8859-1`), UTF-8 otherwise.
pub fn parse_insider_filings_bytes(
    body: &[u8],
    cik: &str,
    base: &str,
) -> Result<Vec<InsiderTransaction>, ParseError> {
    read_filings(Reader::from_reader(body), cik, base)
}

fn read_filings(
    mut reader: Reader<&[u8]>,
    cik: &str,
    base: &str,
) -> Result<Vec<InsiderTransaction>, ParseError> {
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut transactions = Vec::new();
    let mut depth = 0usize;
    let mut filing: Option<Partial> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                let tag = e.local_name();
                match filing.as_mut() {
                    Some(partial) if depth == partial.depth + 1 => {
                        field = Field::from_tag(tag.as_ref());
                        if let Some(field) = field {
                            partial.slot(field).get_or_insert_with(String::new);
                        }
                    }
                    Some(_) => {}
                    None if tag.as_ref() == b"filing" => filing = Some(Partial::at(depth)),
                    None => {}
                }
            }
            Event::Empty(e) => {
                let tag = e.local_name();
                match filing.as_mut() {
                    Some(partial) if depth == partial.depth => {
                        if let Some(field) = Field::from_tag(tag.as_ref()) {
                            partial.slot(field).get_or_insert_with(String::new);
                        }
                    }
                    Some(_) => {}
                    None if tag.as_ref() == b"filing" => {
                        let index = transactions.len();
                        transactions.push(Partial::at(depth).finish(index, cik, base)?);
                    }
                    None => {}
                }
            }
            Event::Text(t) => {
                if let (Some(partial), Some(field)) = (filing.as_mut(), field) {
                    if depth == partial.depth + 1 {
                        let text = t.unescape()?;
                        partial.slot(field).get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
            Event::CData(c) => {
                if let (Some(partial), Some(field)) = (filing.as_mut(), field) {
                    if depth == partial.depth + 1 {
                        let text = reader.decoder().decode(&c)?;
                        partial.slot(field).get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
            Event::End(_) => {
                match filing.take() {
                    Some(partial) if depth == partial.depth => {
                        let index = transactions.len();
                        transactions.push(partial.finish(index, cik, base)?);
                    }
                    Some(partial) => {
                        if depth == partial.depth + 1 {
                            field = None;
                        }
                        filing = Some(partial);
                    }
                    None => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(ParseError::UnexpectedEof);
    }

    Ok(transactions)
}

/// Join a provider link onto `base`; links that are already absolute pass through.
pub fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("https://") || href.starts_with("http://") {
        return href.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

#[derive(Clone, Copy, Debug)]
enum Field {
    DateFiled,
    Type,
    FilingHref,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"dateFiled" => Some(Field::DateFiled),
            b"type" => Some(Field::Type),
            // EDGAR itself spells it `filingHREF`
            b"filingHref" | b"filingHREF" => Some(Field::FilingHref),
            _ => None,
        }
    }
}

/// A `<filing>` whose children are still being read.
#[derive(Debug, Default)]
struct Partial {
    depth: usize,
    date_filed: Option<String>,
    form_type: Option<String>,
    filing_href: Option<String>,
}

impl Partial {
    fn at(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::DateFiled => &mut self.date_filed,
            Field::Type => &mut self.form_type,
            Field::FilingHref => &mut self.filing_href,
        }
    }

    fn finish(self, index: usize, cik: &str, base: &str) -> Result<InsiderTransaction, ParseError> {
        let missing = |field| ParseError::MissingField { field, index };
        let date = self.date_filed.ok_or_else(|| missing("dateFiled"))?;
        let form_type = self.form_type.ok_or_else(|| missing("type"))?;
        let href = self.filing_href.ok_or_else(|| missing("filingHref"))?;

        Ok(InsiderTransaction::new(
            cik,
            date.trim(),
            form_type.trim(),
            absolute_url(base, href.trim()),
        ))
    }
}
