//! Input and output port descriptors.

use weft_core::{CacheIndex, InputPortIndex, OutputPortIndex, Ticket};

/// Whether a port carries a fixed-size numeric vector or a type-erased
/// value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortDataType {
    /// A numeric vector of the given size.
    Vector {
        /// Number of elements.
        size: usize,
    },
    /// A type-erased value.
    Abstract,
}

/// An input port, indexed by declaration order.
#[derive(Clone, Debug)]
pub struct InputPort {
    index: InputPortIndex,
    name: String,
    data_type: PortDataType,
}

impl InputPort {
    pub(crate) fn new(index: InputPortIndex, name: String, data_type: PortDataType) -> Self {
        Self {
            index,
            name,
            data_type,
        }
    }

    /// The port's index.
    pub fn index(&self) -> InputPortIndex {
        self.index
    }

    /// The port's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The port's data type.
    pub fn data_type(&self) -> PortDataType {
        self.data_type
    }

    /// The port's dependency ticket.
    pub fn ticket(&self) -> Ticket {
        Ticket::InputPort(self.index)
    }
}

/// An output port backed by a cache entry.
///
/// The port and its entry have distinct tickets; the port's tracker is
/// subscribed to the entry's tracker when a context is built.
#[derive(Clone, Debug)]
pub struct OutputPort {
    index: OutputPortIndex,
    name: String,
    data_type: PortDataType,
    cache_index: CacheIndex,
}

impl OutputPort {
    pub(crate) fn new(
        index: OutputPortIndex,
        name: String,
        data_type: PortDataType,
        cache_index: CacheIndex,
    ) -> Self {
        Self {
            index,
            name,
            data_type,
            cache_index,
        }
    }

    /// The port's index.
    pub fn index(&self) -> OutputPortIndex {
        self.index
    }

    /// The port's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The port's data type.
    pub fn data_type(&self) -> PortDataType {
        self.data_type
    }

    /// The backing cache entry's index.
    pub fn cache_index(&self) -> CacheIndex {
        self.cache_index
    }

    /// The port's dependency ticket.
    pub fn ticket(&self) -> Ticket {
        Ticket::OutputPort(self.index)
    }
}
