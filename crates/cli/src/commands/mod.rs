pub mod inspect;
pub mod version;
pub mod watch;

use virtjob::JobStatusRecord;

pub fn print_record(record: &JobStatusRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(record)?);
    } else {
        print_text(record);
    }
    Ok(())
}

fn print_text(record: &JobStatusRecord) {
    println!("Job: {:?}", record.kind);
    println!(
        "  Time: elapsed={} ms, remaining={} ms, downtime={} ms, setup={} ms",
        record.time_elapsed, record.time_remaining, record.downtime, record.setup_time
    );
    println!(
        "  Data: total={}, processed={}, remaining={}{}",
        record.data_total,
        record.data_processed,
        record.data_remaining,
        record
            .progress_percent()
            .map_or(String::new(), |p| format!(" ({p}%)"))
    );
    println!(
        "  Memory: total={}, processed={}, remaining={}, bps={}",
        record.memory_total, record.memory_processed, record.memory_remaining, record.memory_bps
    );
    println!(
        "  Disk: total={}, processed={}, remaining={}, bps={}",
        record.disk_total, record.disk_processed, record.disk_remaining, record.disk_bps
    );
    if record.comp_bytes > 0 || record.comp_pages > 0 {
        println!(
            "  Compression: cache={}, bytes={}, pages={}, misses={}, overflow={}",
            record.comp_cache,
            record.comp_bytes,
            record.comp_pages,
            record.comp_cache_misses,
            record.comp_overflow
        );
    }
}
