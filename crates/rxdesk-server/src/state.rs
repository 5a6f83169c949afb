//! Shared handler state and its construction from settings.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rxdesk_core::{
    AdviceEngine, DecisionTree, DoctorRoster, OcrEngine, RecordDesk, Responder, RiskClassifier,
    TesseractCli,
};
use rxdesk_llm::{GeminiClient, GeminiConfig, LanguageModel, LlmError};

use crate::settings::Settings;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<RecordDesk>,
    pub settings: Arc<Settings>,
    /// Pinned date for date-dependent answers; the local date when unset
    fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(desk: Arc<RecordDesk>, settings: Settings) -> Self {
        Self {
            desk,
            settings: Arc::new(settings),
            fixed_today: None,
        }
    }

    pub fn with_fixed_date(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Load the risk model named in settings. Failures disable the risk rule.
pub fn load_risk_model(settings: &Settings) -> Option<Arc<dyn RiskClassifier>> {
    if !settings.risk.enabled {
        tracing::info!("Risk model disabled");
        return None;
    }

    let loaded = match &settings.risk.model_path {
        Some(path) => DecisionTree::load(path),
        None => DecisionTree::bundled(),
    };

    match loaded {
        Ok(tree) => {
            tracing::info!(
                path = settings.risk.model_path.as_deref().unwrap_or("bundled"),
                nodes = tree.node_count(),
                "Risk model loaded"
            );
            Some(Arc::new(tree))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Risk model unavailable, risk advice disabled");
            None
        }
    }
}

/// Build the Gemini client. Must be called outside the async runtime.
pub fn build_language_model(settings: &Settings) -> Result<Arc<dyn LanguageModel>, LlmError> {
    let config = GeminiConfig {
        endpoint: settings.llm.endpoint.clone(),
        model: settings.llm.model.clone(),
        api_key: settings.api_key().unwrap_or_default(),
        timeout_secs: settings.llm.timeout_secs,
    };
    Ok(Arc::new(GeminiClient::new(config)?))
}

/// Wire the desk from settings and an already-built language model.
pub fn build_desk(settings: &Settings, llm: Arc<dyn LanguageModel>) -> RecordDesk {
    let advice = AdviceEngine::new(load_risk_model(settings));
    let responder =
        Responder::new(advice, llm).with_missing_record_policy(settings.chat.missing_record);
    let ocr: Arc<dyn OcrEngine> = Arc::new(
        TesseractCli::new(settings.ocr.command.clone()).with_args(settings.ocr.args.clone()),
    );

    RecordDesk::new(settings.database.path.clone(), responder, ocr)
        .with_roster(DoctorRoster::new(settings.doctors.clone()))
}
