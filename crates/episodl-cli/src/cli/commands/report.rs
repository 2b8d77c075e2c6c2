//! Plain-text rendering of job state shared by `download` and `status`.

use episodl_core::job::JobState;
use episodl_core::outcome::OutcomeStatus;

/// One progress line, e.g. `  4 / 12 episodes (33.3%)  processing`.
pub fn progress_line(job: &JobState) -> String {
    let p = job.progress();
    format!(
        "  {} / {} episodes ({:.1}%)  {}",
        p.processed,
        p.total,
        p.fraction() * 100.0,
        job.status
    )
}

pub fn print_summary(job: &JobState) {
    println!("Job:     {}", job.id);
    println!("Source:  {}", job.source_url);
    println!("Title:   {}", job.title_name.as_deref().unwrap_or("-"));
    println!("Status:  {}", job.status);
    if let Some(msg) = &job.error_message {
        println!("Error:   {}", msg);
    }
    let ok = job.results.iter().filter(|r| r.status.is_success()).count();
    println!(
        "Episodes: {} processed of {}, {} downloaded, {} not downloaded",
        job.processed_count,
        job.total_episodes,
        ok,
        job.results.len() - ok
    );
}

pub fn print_results(job: &JobState) {
    if job.results.is_empty() {
        return;
    }
    println!(
        "  {:<6}  {:<7}  {:<15}  {}",
        "SEASON", "EPISODE", "STATUS", "DETAIL"
    );
    for r in &job.results {
        let detail = match r.status {
            OutcomeStatus::Downloaded => r.local_path.as_deref().unwrap_or("-"),
            _ => r.error_message.as_deref().unwrap_or("-"),
        };
        println!(
            "  {:<6}  {:<7}  {:<15}  {}",
            r.season,
            r.number,
            r.status.as_str(),
            detail
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use episodl_core::job::JobId;

    #[test]
    fn progress_line_shows_counts_and_status() {
        let mut job = JobState::new(JobId::new_v4(), "src");
        job.begin().unwrap();
        job.set_details("Show", 4).unwrap();
        assert_eq!(progress_line(&job), "  0 / 4 episodes (0.0%)  processing");
    }
}
