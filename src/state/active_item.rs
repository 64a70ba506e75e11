//! The active row, e.g. the row shown in a details drawer.

use crate::url_params::{ParamCodec, ParamUpdate, RawParams, SerializedParams, raw_value};

#[derive(Debug, Clone, Default)]
pub struct ActiveItemState {
    active: Option<String>,
}

impl ActiveItemState {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active.as_deref()
    }

    #[must_use]
    pub fn is_active(&self, row_key: &str) -> bool {
        self.active.as_deref() == Some(row_key)
    }

    pub fn set_active(&mut self, row_key: Option<&str>) {
        self.active = row_key.map(str::to_string);
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn restore(&mut self, active: Option<String>) {
        self.active = active;
    }
}

/// Persists the active row key as `activeItem`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveItemParamCodec;

impl ActiveItemParamCodec {
    pub const KEY: &'static str = "activeItem";
}

impl ParamCodec for ActiveItemParamCodec {
    type Value = Option<String>;

    fn keys(&self) -> Vec<String> {
        vec![Self::KEY.to_string()]
    }

    fn serialize(&self, value: &Self::Value) -> SerializedParams {
        let mut params = SerializedParams::new();
        params.insert(Self::KEY.to_string(), ParamUpdate::from_option(value.clone()));
        params
    }

    fn deserialize(&self, params: &RawParams, _fallback: &Self::Value) -> Self::Value {
        raw_value(params, Self::KEY).map(str::to_string)
    }
}
