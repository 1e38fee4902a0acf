//! Recording runtime used by unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::events::{EventCallback, Props};
use crate::host::{RenderMode, UiRuntime};
use crate::memory::MemoryNode;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Mount {
        component: &'static str,
        props: Value,
        mode: RenderMode,
    },
    Update {
        props: Value,
        mode: RenderMode,
    },
    Unmount,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    last_props: Option<Props>,
    fail_next_mount: bool,
}

/// Shared view of everything a [`RecordingRuntime`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Rc<RefCell<State>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    /// Data values of the most recent mount or update.
    pub fn last_props(&self) -> Option<Value> {
        self.0.borrow().last_props.as_ref().map(Props::to_json)
    }

    pub fn last_callback(&self, name: &str) -> Option<EventCallback> {
        self.0
            .borrow()
            .last_props
            .as_ref()
            .and_then(|props| props.callback(name).cloned())
    }

    pub fn fail_next_mount(&self) {
        self.0.borrow_mut().fail_next_mount = true;
    }
}

#[derive(Debug, thiserror::Error)]
#[error("mount failed")]
pub struct MountFailed;

#[derive(Debug)]
pub struct RecordingRuntime {
    recorder: Recorder,
}

impl RecordingRuntime {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

impl UiRuntime for RecordingRuntime {
    type Container = MemoryNode;
    type Component = &'static str;
    type Session = MemoryNode;
    type Error = MountFailed;

    fn mount(
        &self,
        component: &Self::Component,
        container: &MemoryNode,
        props: Props,
        mode: RenderMode,
    ) -> Result<MemoryNode, MountFailed> {
        let mut state = self.recorder.0.borrow_mut();
        if state.fail_next_mount {
            state.fail_next_mount = false;
            return Err(MountFailed);
        }

        state.calls.push(Call::Mount {
            component: *component,
            props: props.to_json(),
            mode,
        });
        state.last_props = Some(props);
        Ok(container.clone())
    }

    fn update(
        &self,
        _session: &mut MemoryNode,
        props: Props,
        mode: RenderMode,
    ) -> Result<(), MountFailed> {
        let mut state = self.recorder.0.borrow_mut();
        state.calls.push(Call::Update {
            props: props.to_json(),
            mode,
        });
        state.last_props = Some(props);
        Ok(())
    }

    fn unmount(&self, _session: MemoryNode) -> Result<(), MountFailed> {
        self.recorder.0.borrow_mut().calls.push(Call::Unmount);
        Ok(())
    }
}
