use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::{Bot, ChatMessage, MetaRewriteConfig, SedConfig};

#[pyclass]
#[derive(Clone)]
struct RequestPy {
    #[pyo3(get)]
    separator: char,
    #[pyo3(get)]
    pattern: String,
    #[pyo3(get)]
    replacement: String,
    #[pyo3(get)]
    start_occurrence: usize,
    #[pyo3(get)]
    global_: bool,
    #[pyo3(get)]
    case_insensitive: bool,
    #[pyo3(get)]
    verbose: bool,
}

impl From<crate::SubstitutionRequest> for RequestPy {
    fn from(r: crate::SubstitutionRequest) -> Self {
        Self {
            separator: r.separator,
            pattern: r.pattern,
            replacement: r.replacement,
            start_occurrence: r.flags.start_occurrence,
            global_: r.flags.global,
            case_insensitive: r.flags.case_insensitive,
            verbose: r.flags.verbose,
        }
    }
}

#[pyclass(name = "SedBot")]
struct SedBotPy {
    bot: Bot,
}

#[pymethods]
impl SedBotPy {
    #[new]
    #[pyo3(signature = (history_capacity=crate::DEFAULT_HISTORY_CAPACITY, max_output_length=crate::DEFAULT_MAX_OUTPUT_LENGTH, meta_rewrite=false))]
    fn new(history_capacity: usize, max_output_length: usize, meta_rewrite: bool) -> PyResult<Self> {
        let config = SedConfig {
            history_capacity,
            max_output_length,
            meta_rewrite: MetaRewriteConfig { enabled: meta_rewrite },
        };
        config.validate().map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { bot: Bot::new(config) })
    }

    /// Record a message and return the reply line, if any.
    fn handle(&self, network: &str, channel: &str, sender: &str, text: &str) -> Option<String> {
        self.bot
            .handle_message(&ChatMessage::new(network, channel, sender, text))
            .map(|r| r.text)
    }

    fn record(&self, network: &str, channel: &str, sender: &str, text: &str) -> u64 {
        self.bot
            .record(&ChatMessage::new(network, channel, sender, text))
            .sequence_number
    }

    fn try_evaluate(&self, network: &str, channel: &str, sender: &str, text: &str) -> Option<String> {
        self.bot
            .try_evaluate_command(&ChatMessage::new(network, channel, sender, text))
    }

    /// `(sender, text)` pairs, oldest first.
    fn recent(&self, network: &str, channel: &str) -> Vec<(String, String)> {
        self.bot
            .history()
            .recent(&crate::ChannelKey::new(network, channel))
            .into_iter()
            .map(|e| (e.sender, e.text))
            .collect()
    }
}

#[pyfunction]
fn parse(command: &str) -> PyResult<RequestPy> {
    crate::parse_substitution(command)
        .map(RequestPy::from)
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn sedbot(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<RequestPy>()?;
    m.add_class::<SedBotPy>()?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    Ok(())
}
