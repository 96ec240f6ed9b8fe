// ── Panel facade ──
//
// Ties one gateway connection to the query and event layers. The facade
// holds no connection lifecycle of its own — connecting, reconnecting and
// disconnecting are the transport implementation's business.

use std::sync::Arc;

use crate::config::PanelOptions;
use crate::events::EventLog;
use crate::gateway::TableGateway;
use crate::model::Model;
use crate::query::QuerySet;
use crate::topology::{AuxInput, DeviceModel, Door, Reader};

/// One connected access-control panel.
///
/// Vends lazy [`QuerySet`]s over the device tables, the root realtime
/// [`EventLog`], and per-door/reader/aux-input event views.
pub struct Panel {
    gateway: Arc<dyn TableGateway>,
    options: PanelOptions,
    events: EventLog,
}

impl Panel {
    pub fn new(gateway: Arc<dyn TableGateway>, options: PanelOptions) -> Self {
        let events = EventLog::new(Arc::clone(&gateway), options.event_capacity);
        Self {
            gateway,
            options,
            events,
        }
    }

    /// A fresh query over table `M` — no filters, nothing fetched yet.
    pub fn table<M: Model>(&self) -> QuerySet<M> {
        QuerySet::new(Arc::clone(&self.gateway))
    }

    /// The root realtime event log. All door/reader/aux-input views share
    /// its buffer.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn doors(&self) -> Vec<Door> {
        self.options
            .device_model
            .doors()
            .map(|n| Door::new(n, self.events.clone()))
            .collect()
    }

    pub fn readers(&self) -> Vec<Reader> {
        self.options
            .device_model
            .doors()
            .map(|n| Reader::new(n, self.events.clone()))
            .collect()
    }

    pub fn aux_inputs(&self) -> Vec<AuxInput> {
        self.options
            .device_model
            .doors()
            .map(|n| AuxInput::new(n, self.events.clone()))
            .collect()
    }

    pub fn device_model(&self) -> DeviceModel {
        self.options.device_model
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    /// The underlying gateway handle, for callers composing their own
    /// queries or logs.
    pub fn gateway(&self) -> Arc<dyn TableGateway> {
        Arc::clone(&self.gateway)
    }
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("device_model", &self.options.device_model)
            .field("buffered_events", &self.events.buffered())
            .finish()
    }
}
