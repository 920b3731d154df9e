//////////////////////////////////////////////////////////////////
// schema
//////////////////////////////////////////////////////////////////

/// `insider_trades` holds every filing reference ever fetched; rows are only appended or
/// wiped, never updated.
pub(crate) static CREATE_INSIDER_TRADES: &str = "
    CREATE TABLE IF NOT EXISTS insider_trades (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        cik                 TEXT NOT NULL,
        transaction_date    TEXT NOT NULL,
        form_type           TEXT NOT NULL,
        filing_url          TEXT NOT NULL
    )
";

/// Not unique: repeated fetches of the same company are allowed to accumulate.
pub(crate) static CREATE_INSIDER_TRADES_CIK_INDEX: &str = "
    CREATE INDEX IF NOT EXISTS insider_trades_cik_dated
    ON insider_trades (cik, transaction_date)
";

//////////////////////////////////////////////////////////////////
// insider trades
//////////////////////////////////////////////////////////////////

pub(crate) static INSERT_INSIDER_TRADE: &str = "
    INSERT INTO insider_trades (cik, transaction_date, form_type, filing_url)
    VALUES (?, ?, ?, ?)
";

/// Dates are compared as plain text; EDGAR's `YYYY-MM-DD` makes that chronological.
pub(crate) static SELECT_INSIDER_TRADES_BY_CIK: &str = "
    SELECT id, cik, transaction_date, form_type, filing_url
    FROM insider_trades
    WHERE cik = ?
    ORDER BY transaction_date DESC, id DESC
";

pub(crate) static DELETE_INSIDER_TRADES: &str = "
    DELETE FROM insider_trades
";

pub(crate) static COUNT_INSIDER_TRADES: &str = "
    SELECT COUNT(*) FROM insider_trades
";
