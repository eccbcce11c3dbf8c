use crate::calendar::{parse_date, DATE_FMT};
use crate::ledger::{Duty, RunSlot};
use crate::model::Faculty;
use crate::scheduler::Scheduler;
use anyhow::{bail, Context};
use chrono::{Duration, NaiveDate, Weekday};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Import de membres depuis CSV :
/// header `name,role[,load][,family][,unavailable_dates][,unavailable_weekdays]`,
/// listes séparées par `;`, dates en `mm/dd/yyyy`.
pub fn import_members_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Faculty>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let role = rec.get(1).context("missing role")?.trim();
        if name.is_empty() || role.is_empty() {
            bail!("invalid member row (empty)");
        }
        let role = role.parse()?;
        let mut member = match rec.get(2).map(str::trim).filter(|s| !s.is_empty()) {
            Some(load) => Faculty::with_load(name, role, load.parse()?),
            None => Faculty::new(name, role),
        };
        if let Some(family) = rec.get(3).map(str::trim).filter(|s| !s.is_empty()) {
            member = member.family(family);
        }
        if let Some(dates) = rec.get(4).map(str::trim).filter(|s| !s.is_empty()) {
            for raw in dates.split(';').filter(|s| !s.trim().is_empty()) {
                member.set_unavailable_date(
                    parse_date(raw).with_context(|| format!("unavailable date for {name}"))?,
                );
            }
        }
        if let Some(dows) = rec.get(5).map(str::trim).filter(|s| !s.is_empty()) {
            for raw in dows.split(';').filter(|s| !s.trim().is_empty()) {
                let dow: Weekday = raw
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid weekday {raw:?} for {name}"))?;
                member.set_unavailable_dow(dow);
            }
        }
        out.push(member);
    }
    Ok(out)
}

/// Export d'une responsabilité au format d'import calendrier :
/// header `Subject,Start Date,End Date,All Day Event,Description,Private`,
/// une ligne par jour assigné (filtrable par membre).
pub fn export_duty_csv<P: AsRef<Path>>(
    path: P,
    sched: &Scheduler,
    duty: Duty,
    member: Option<&str>,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "Subject",
        "Start Date",
        "End Date",
        "All Day Event",
        "Description",
        "Private",
    ])?;
    let prefix = match duty {
        Duty::Dorm => sched.name(),
        Duty::Run(slot) => slot.label(),
    };
    let dates: Vec<NaiveDate> = match duty {
        Duty::Dorm => sched.ledger().dates().collect(),
        Duty::Run(_) => sched.ledger().run_dates(),
    };
    for date in dates {
        let Some(holder) = sched.ledger().on(duty, date) else {
            continue;
        };
        if member.is_some_and(|m| m != holder) {
            continue;
        }
        let subject = format!("{prefix} {holder}");
        let start = date.format(DATE_FMT).to_string();
        let end = (date + Duration::days(1)).format(DATE_FMT).to_string();
        w.write_record([subject.as_str(), start.as_str(), end.as_str(), "TRUE", "", "FALSE"])?;
    }
    w.flush()?;
    Ok(())
}

/// Export des totaux par membre :
/// header `name,total,school_nights,fridays,saturdays,run_1,run_2`.
pub fn export_counts_csv<P: AsRef<Path>>(path: P, sched: &Scheduler) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "name",
        "total",
        "school_nights",
        "fridays",
        "saturdays",
        "run_1",
        "run_2",
    ])?;
    let mut buf = itoa::Buffer::new();
    for member in sched.roster().members() {
        let counts = sched
            .counts_for(&member.name)
            .context("counts for roster member")?;
        let row = [
            member.name.clone(),
            buf.format(counts.total).to_string(),
            buf.format(counts.school_nights).to_string(),
            buf.format(counts.fridays).to_string(),
            buf.format(counts.saturdays).to_string(),
            buf.format(counts.run1).to_string(),
            buf.format(counts.run2).to_string(),
        ];
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct DayExport<'a> {
    date: NaiveDate,
    dorm: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run1: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run2: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ScheduleExport<'a> {
    name: &'a str,
    days: Vec<DayExport<'a>>,
}

/// Export JSON du planning complet (écriture atomique).
pub fn export_schedule_json<P: AsRef<Path>>(path: P, sched: &Scheduler) -> anyhow::Result<()> {
    let ledger = sched.ledger();
    let days: Vec<DayExport<'_>> = ledger
        .dates()
        .map(|date| DayExport {
            date,
            dorm: ledger.dorm_on(date),
            run1: ledger.run_on(RunSlot::First, date),
            run2: ledger.run_on(RunSlot::Second, date),
        })
        .collect();
    let export = ScheduleExport {
        name: sched.name(),
        days,
    };
    let json = serde_json::to_vec_pretty(&export)?;

    let path = path.as_ref();
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))
        .context("creating temp file")?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).context("atomic rename")?;
    Ok(())
}
