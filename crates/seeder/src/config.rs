use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::{
    error::{Result, SeedError},
    pipeline::{PipelineConfig, RunMode, Sources},
    source::{datasets, ApiSource, Source},
    validate::FieldPolicies,
};

/// Source setting that selects the remote dataset instead of a file.
pub const API_SOURCE: &str = "api";

/// Everything a seed run needs, read from the environment.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub database_url: String,
    pub pipeline: PipelineConfig,
    pub sources: Sources,
}

impl SeedConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let database_url = vars.required("DATABASE_URL")?;
        let run_mode: RunMode = vars.parse_required("SEED_RUN_MODE")?;
        let batch_size: usize = vars.parse_or("SEED_BATCH_SIZE", 100)?;
        if batch_size == 0 {
            return Err(SeedError::Config(
                "SEED_BATCH_SIZE must be at least 1".to_owned(),
            ));
        }

        let defaults = FieldPolicies::default();
        let policies = FieldPolicies {
            stop_code: vars.parse_or("SEED_ON_INVALID_STOP_CODE", defaults.stop_code)?,
            line_code: vars.parse_or("SEED_ON_INVALID_LINE_CODE", defaults.line_code)?,
            line_variant: vars.parse_or("SEED_ON_INVALID_LINE_VARIANT", defaults.line_variant)?,
        };

        let api = ApiSettings {
            page_size: vars.parse_or("SEED_API_PAGE_SIZE", 100)?,
            page_delay: Duration::from_millis(vars.parse_or("SEED_API_PAGE_DELAY_MS", 500)?),
        };
        let sources = Sources {
            stops: vars.source(
                "SEED_STOPS_SOURCE",
                datasets::STOP_DETAILS,
                datasets::STOP_DETAILS_FIELDS,
                &api,
            )?,
            lines: vars.source(
                "SEED_LINES_SOURCE",
                datasets::STOPS_BY_LINE,
                datasets::STOPS_BY_LINE_FIELDS,
                &api,
            )?,
            line_metadata: Source::File(vars.required("SEED_LINE_METADATA_FILE")?.into()),
            line_text_colors: Source::File(vars.required("SEED_LINE_TEXT_COLORS_FILE")?.into()),
        };

        Ok(Self {
            database_url,
            pipeline: PipelineConfig {
                run_mode,
                batch_size,
                policies,
            },
            sources,
        })
    }
}

struct ApiSettings {
    page_size: usize,
    page_delay: Duration,
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String> {
        self.get(name)
            .ok_or_else(|| SeedError::Config(format!("{name} is not set")))
    }

    fn parse<T>(&self, name: &str, value: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: ToString,
    {
        value
            .trim()
            .parse()
            .map_err(|why: T::Err| SeedError::Config(format!("{name}: {}", why.to_string())))
    }

    fn parse_required<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: ToString,
    {
        let value = self.required(name)?;
        self.parse(name, &value)
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match self.get(name) {
            Some(value) => self.parse(name, &value),
            None => Ok(default),
        }
    }

    fn source(
        &self,
        name: &str,
        url: &str,
        fields: &'static [&'static str],
        api: &ApiSettings,
    ) -> Result<Source> {
        let value = self.required(name)?;
        if !value.trim().eq_ignore_ascii_case(API_SOURCE) {
            return Ok(Source::File(PathBuf::from(value)));
        }

        let api_key = self.get("STIB_API_KEY").ok_or_else(|| {
            SeedError::Config(format!("STIB_API_KEY is required when {name} is '{API_SOURCE}'"))
        })?;
        let mut source = ApiSource::new(url, fields, api_key);
        source.page_size = api.page_size.max(1);
        source.page_delay = api.page_delay;
        Ok(Source::Api(source))
    }
}
