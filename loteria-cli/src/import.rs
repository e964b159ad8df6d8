use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use loteria_db::rusqlite::Connection;
use std::path::Path;

use loteria_core::{Draw, LotteryKind, LotteryRule};
use loteria_db::db::insert_draw;

/// Accepts `DD/MM/YYYY` (as published) and ISO dates.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .with_context(|| format!("Formato de data inválido: '{}'", raw))
}

/// `contest;date;n1;...;nk`
fn parse_record(record: &csv::StringRecord, rule: &LotteryRule) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Campo ausente no índice {}", idx))
    };

    let contest_str = get(0)?;
    let contest: u32 = contest_str
        .parse()
        .with_context(|| format!("Concurso inválido: '{}'", contest_str))?;
    let date = parse_date(&get(1)?)?;

    let picks = rule.numbers_per_draw();
    if record.len() < 2 + picks {
        bail!(
            "Concurso {}: {} dezenas esperadas, {} encontradas",
            contest,
            picks,
            record.len().saturating_sub(2)
        );
    }
    let numbers = (2..2 + picks)
        .map(|idx| {
            let s = get(idx)?;
            s.parse::<u8>()
                .with_context(|| format!("Dezena inválida '{}' (índice {})", s, idx))
        })
        .collect::<Result<Vec<u8>>>()?;

    let draw = Draw::new(contest, date, numbers);
    draw.validate(rule)?;
    Ok(draw)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, kind: LotteryKind, path: &Path) -> Result<ImportResult> {
    let rule = kind.rule();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Não foi possível abrir {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Não foi possível iniciar a transação")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        let draw = record_result
            .map_err(anyhow::Error::from)
            .and_then(|record| parse_record(&record, &rule));
        match draw {
            Ok(draw) => match insert_draw(&tx, kind, &draw) {
                Ok(true) => result.inserted += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => {
                    log::warn!("insert failed at line {}: {:#}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                log::warn!("line {} rejected: {:#}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Falha no commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loteria_db::db::{count_draws, fetch_last_draws, migrate};

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("17/02/2026").unwrap(), NaiveDate::from_ymd_opt(2026, 2, 17).unwrap());
        assert_eq!(parse_date("2020-01-01").unwrap(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(parse_date("31/02/2024").is_err());
        assert!(parse_date("hier").is_err());
    }

    #[test]
    fn test_parse_record_ok() {
        let rule = LotteryKind::MegaSena.rule();
        let draw = parse_record(&record(&["2700", "09/03/2024", "42", "4", "8", "15", "16", "23"]), &rule).unwrap();
        assert_eq!(draw.contest(), 2700);
        assert_eq!(draw.numbers(), &[4, 8, 15, 16, 23, 42]);
        assert_eq!(draw.date_iso(), "2024-03-09");
    }

    #[test]
    fn test_parse_record_too_few_numbers() {
        let rule = LotteryKind::MegaSena.rule();
        assert!(parse_record(&record(&["1", "01/01/2024", "1", "2", "3"]), &rule).is_err());
    }

    #[test]
    fn test_parse_record_out_of_range() {
        let rule = LotteryKind::MegaSena.rule();
        assert!(parse_record(&record(&["1", "01/01/2024", "1", "2", "3", "4", "5", "61"]), &rule).is_err());
    }

    #[test]
    fn test_parse_record_lotomania_zero() {
        let rule = LotteryKind::Lotomania.rule();
        let mut fields = vec!["3000", "01/01/2024"];
        let numbers: Vec<String> = (0..20).map(|n| (n * 5).to_string()).collect();
        fields.extend(numbers.iter().map(String::as_str));
        let draw = parse_record(&record(&fields), &rule).unwrap();
        assert_eq!(draw.numbers()[0], 0);
    }

    #[test]
    fn test_import_csv() {
        let dir = std::env::temp_dir().join(format!("loteria-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quina.csv");
        std::fs::write(
            &path,
            "concurso;data;d1;d2;d3;d4;d5\n\
             1;13/03/1994;25;45;60;76;79\n\
             2;17/03/1994;13;30;58;63;64\n\
             2;17/03/1994;13;30;58;63;64\n\
             3;21/03/1994;1;2;3;4;99\n",
        ).unwrap();

        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let result = import_csv(&conn, LotteryKind::Quina, &path).unwrap();
        assert_eq!(result.total_records, 4);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 1);
        assert_eq!(count_draws(&conn, LotteryKind::Quina).unwrap(), 2);
        assert_eq!(fetch_last_draws(&conn, LotteryKind::Quina, 1).unwrap()[0].contest(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
