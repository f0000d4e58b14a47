//! Interactive dashboard session.
//!
//! Renders the view, then reads commands line by line. Every refresh or
//! retry spawns its own fetch task; results come back over a channel and
//! are applied in the order they arrive.

use super::Dashboard;
use crate::cli::OutputFormat;
use crate::client::{FeedbackSource, FetchError};
use crate::models::FeedbackRecord;
use crate::report::{render_state, RenderOptions, ReportMetadata};
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

type FetchOutcome = (u64, Result<Vec<FeedbackRecord>, FetchError>);

/// A command typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Retry,
    Quit,
    Help,
}

impl Command {
    /// Parse one input line. Returns `None` for anything unrecognised.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "r" | "refresh" => Some(Command::Refresh),
            "t" | "retry" => Some(Command::Retry),
            "q" | "quit" | "exit" => Some(Command::Quit),
            "h" | "help" | "?" => Some(Command::Help),
            _ => None,
        }
    }
}

/// An interactive dashboard bound to a feedback source and an output.
pub struct Session<S, W> {
    source: Arc<S>,
    dashboard: Dashboard,
    format: OutputFormat,
    options: RenderOptions,
    out: W,
    clear_screen: bool,
    started: HashMap<u64, Instant>,
    last_duration: f64,
    in_flight: usize,
}

impl<S: FeedbackSource, W: Write> Session<S, W> {
    pub fn new(source: Arc<S>, format: OutputFormat, options: RenderOptions, out: W) -> Self {
        Self {
            source,
            dashboard: Dashboard::new(),
            format,
            options,
            out,
            clear_screen: false,
            started: HashMap::new(),
            last_duration: 0.0,
            in_flight: 0,
        }
    }

    /// Clear the terminal before each render. Only meaningful when the
    /// output is the process's stdout.
    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    #[cfg(test)]
    fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }

    /// Run until the user quits, or until input closes and every fetch
    /// in flight has landed.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();

        let request = self.dashboard.start_fetch();
        self.spawn_fetch(request, &tx);
        self.render()?;

        let mut lines = input.lines();
        let mut input_open = true;

        loop {
            tokio::select! {
                Some((request, result)) = rx.recv() => {
                    self.finish_fetch(request, result);
                    self.render()?;
                    if !input_open && self.in_flight == 0 {
                        break;
                    }
                }
                line = lines.next_line(), if input_open => {
                    let Some(line) = line.context("Failed to read command")? else {
                        debug!("Input closed with {} fetches in flight", self.in_flight);
                        input_open = false;
                        if self.in_flight == 0 {
                            break;
                        }
                        continue;
                    };

                    if line.trim().is_empty() {
                        continue;
                    }

                    match Command::parse(&line) {
                        Some(Command::Quit) => {
                            info!("Quitting with {} fetches in flight", self.in_flight);
                            break;
                        }
                        Some(Command::Refresh) => {
                            let request = self.dashboard.begin_refresh();
                            self.spawn_fetch(request, &tx);
                            self.render()?;
                        }
                        Some(Command::Retry) => {
                            let request = self.dashboard.retry();
                            self.spawn_fetch(request, &tx);
                            self.render()?;
                        }
                        Some(Command::Help) | None => self.print_help()?,
                    }
                }
            }
        }

        Ok(())
    }

    fn spawn_fetch(&mut self, request: u64, tx: &mpsc::UnboundedSender<FetchOutcome>) {
        self.started.insert(request, Instant::now());
        self.in_flight += 1;
        if self.in_flight > 1 {
            debug!("{} fetches in flight", self.in_flight);
        }

        let source = Arc::clone(&self.source);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_feedback().await;
            // The receiver is gone once the session has quit.
            let _ = tx.send((request, result));
        });
    }

    fn finish_fetch(&mut self, request: u64, result: Result<Vec<FeedbackRecord>, FetchError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Some(start) = self.started.remove(&request) {
            self.last_duration = start.elapsed().as_secs_f64();
        }
        self.dashboard.apply(request, result);
    }

    fn render(&mut self) -> Result<()> {
        let metadata = ReportMetadata {
            api_url: self.source.describe(),
            generated_at: Utc::now(),
            duration_seconds: self.last_duration,
        };
        let output = render_state(self.dashboard.state(), metadata, self.format, &self.options)?;

        if self.clear_screen {
            console::Term::stdout()
                .clear_screen()
                .context("Failed to clear terminal")?;
        }

        writeln!(self.out, "{}", output).context("Failed to write dashboard")?;
        if self.format == OutputFormat::Terminal {
            writeln!(self.out, "  {}", console::style(self.prompt()).dim())
                .context("Failed to write dashboard")?;
        }
        self.out.flush().context("Failed to write dashboard")?;

        Ok(())
    }

    fn prompt(&self) -> &'static str {
        if self.dashboard.is_error() {
            "[t] try again  [q] quit"
        } else if self.dashboard.is_refreshing() {
            "Refreshing...  [r] refresh  [q] quit"
        } else {
            "[r] refresh  [q] quit"
        }
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "Commands: r/refresh, t/retry, q/quit, h/help"
        )
        .context("Failed to write help")?;
        self.out.flush().context("Failed to write help")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FETCH_FAILURE_MESSAGE;
    use crate::dashboard::DashboardState;
    use crate::report::LOADING_MESSAGE;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    type Scripted = (u64, Result<Vec<FeedbackRecord>, FetchError>);

    /// Source that answers each call with the next scripted result after
    /// the scripted delay in milliseconds.
    struct ScriptedSource {
        script: Mutex<VecDeque<Scripted>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FeedbackSource for ScriptedSource {
        async fn fetch_feedback(&self) -> Result<Vec<FeedbackRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some((delay, result)) => {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    result
                }
                None => Ok(Vec::new()),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn records(n: u64) -> Vec<FeedbackRecord> {
        (1..=n)
            .map(|id| FeedbackRecord {
                id,
                source: "App".to_string(),
                ..Default::default()
            })
            .collect()
    }

    fn total(session: &Session<ScriptedSource, Vec<u8>>) -> Option<usize> {
        session.dashboard().aggregation().map(|agg| agg.stats.total)
    }

    fn output_text(session: &Session<ScriptedSource, Vec<u8>>) -> String {
        console::strip_ansi_codes(&String::from_utf8_lossy(session.output())).into_owned()
    }

    /// Writer the test can read while the session is still running.
    #[derive(Clone, Default)]
    struct SharedOutput(Arc<Mutex<Vec<u8>>>);

    impl SharedOutput {
        fn text(&self) -> String {
            let bytes = self.0.lock().unwrap();
            console::strip_ansi_codes(&String::from_utf8_lossy(&bytes)).into_owned()
        }
    }

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn session(source: Arc<ScriptedSource>) -> Session<ScriptedSource, Vec<u8>> {
        Session::new(source, OutputFormat::Terminal, RenderOptions::default(), Vec::new())
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("r"), Some(Command::Refresh));
        assert_eq!(Command::parse(" Refresh "), Some(Command::Refresh));
        assert_eq!(Command::parse("t"), Some(Command::Retry));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("?"), Some(Command::Help));
        assert_eq!(Command::parse("delete"), None);
    }

    #[tokio::test]
    async fn test_initial_fetch_renders_dashboard() {
        let source = ScriptedSource::new(vec![(0, Ok(records(2)))]);
        let mut session = session(source.clone());

        session.run(&b""[..]).await.unwrap();

        assert_eq!(total(&session), Some(2));
        assert_eq!(source.calls(), 1);
        let text = output_text(&session);
        assert!(text.contains("Loading feedback data..."));
        assert!(text.contains("Total Feedback"));
        assert!(text.contains("[r] refresh"));
    }

    #[tokio::test]
    async fn test_refresh_fetches_again() {
        let source = ScriptedSource::new(vec![(0, Ok(records(1))), (50, Ok(records(3)))]);
        let mut session = session(source.clone());

        session.run(&b"r\n"[..]).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(total(&session), Some(3));
        assert!(!session.dashboard().is_refreshing());
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let source = ScriptedSource::new(vec![
            (0, Err(FetchError::Decode("bad".to_string()))),
            (30, Ok(records(2))),
        ]);
        let output = SharedOutput::default();
        let mut session = Session::new(
            source.clone(),
            OutputFormat::Terminal,
            RenderOptions::default(),
            output.clone(),
        );
        let (mut input, reader) = tokio::io::duplex(64);

        let handle = tokio::spawn(async move {
            let result = session.run(tokio::io::BufReader::new(reader)).await;
            (session, result)
        });

        // Only send the retry once the error view is on screen.
        tokio::time::timeout(Duration::from_secs(2), async {
            while !output.text().contains(FETCH_FAILURE_MESSAGE) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("error view should render");
        assert!(output.text().contains("[t] try again"));

        input.write_all(b"t\n").await.unwrap();
        drop(input);

        let (session, result) = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("session should finish")
            .unwrap();
        result.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(
            session.dashboard().aggregation().map(|agg| agg.stats.total),
            Some(2)
        );

        let text = output.text();
        let error_at = text.find(FETCH_FAILURE_MESSAGE).unwrap();
        let loading_at = error_at
            + text[error_at..]
                .find(LOADING_MESSAGE)
                .expect("retry should show the loading view");
        assert!(text[loading_at..].contains("Total Feedback"));
    }

    #[tokio::test]
    async fn test_overlapping_refresh_last_arrival_wins() {
        // The first fetch is slow, the refresh is fast: the stale result
        // lands last and is the one shown.
        let source = ScriptedSource::new(vec![(80, Ok(records(1))), (0, Ok(records(4)))]);
        let mut session = session(source.clone());

        session.run(&b"r\n"[..]).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(total(&session), Some(1));
    }

    #[tokio::test]
    async fn test_quit_does_not_wait_for_fetch() {
        let source = ScriptedSource::new(vec![(5_000, Ok(records(1)))]);
        let mut session = session(source.clone());

        tokio::time::timeout(Duration::from_secs(2), session.run(&b"q\n"[..]))
            .await
            .expect("session should quit immediately")
            .unwrap();

        assert_eq!(session.dashboard().state(), &DashboardState::Loading);
    }

    #[tokio::test]
    async fn test_unknown_command_prints_help() {
        let source = ScriptedSource::new(vec![(0, Ok(records(1)))]);
        let mut session = session(source);

        session.run(&b"delete\n"[..]).await.unwrap();

        assert!(output_text(&session).contains("Commands: r/refresh"));
    }

    #[tokio::test]
    async fn test_json_session_has_no_prompt() {
        let source = ScriptedSource::new(vec![(0, Ok(records(1)))]);
        let mut session = Session::new(source, OutputFormat::Json, RenderOptions::default(), Vec::new());

        session.run(&b""[..]).await.unwrap();

        let text = output_text(&session);
        assert!(text.contains("\"status\": \"loading\""));
        assert!(text.contains("\"status\": \"ready\""));
        assert!(!text.contains("[r] refresh"));
    }
}
