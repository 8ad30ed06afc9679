//! Shared collaborators of every entity tool
//!
//! A [`ToolRuntime`] is assembled once at startup and handed to tools behind
//! an `Arc`. Tools capture only identifiers and operations; everything that
//! touches the store is reached through the runtime at call time.

use std::sync::Arc;

use entity_tools_domain::core::error::ConfigurationError;
use entity_tools_domain::entity::{Entity, EntityType};

use super::finder::FinderTool;
use super::synthesizer::ToolSynthesizer;
use super::tool::EntityTool;
use crate::config::ToolingConfig;
use crate::ports::invocation_logger::{InvocationLogger, NoInvocationLogger};
use crate::ports::store::TransactionManager;
use crate::ports::template::TemplateRenderer;
use crate::views::{RepositoryLocator, ViewFactory, ViewRegistry};

pub struct ToolRuntime {
    factory: ViewFactory,
    repositories: RepositoryLocator,
    transactions: Arc<dyn TransactionManager>,
    logger: Arc<dyn InvocationLogger>,
    config: ToolingConfig,
}

impl ToolRuntime {
    pub fn new(
        registry: Arc<ViewRegistry>,
        repositories: RepositoryLocator,
        transactions: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            factory: ViewFactory::new(registry),
            repositories,
            transactions,
            logger: Arc::new(NoInvocationLogger),
            config: ToolingConfig::default(),
        }
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.factory = self.factory.with_templates(templates);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_config(mut self, config: ToolingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn registry(&self) -> &Arc<ViewRegistry> {
        self.factory.registry()
    }

    pub fn factory(&self) -> &ViewFactory {
        &self.factory
    }

    pub fn repositories(&self) -> &RepositoryLocator {
        &self.repositories
    }

    pub fn transactions(&self) -> &dyn TransactionManager {
        self.transactions.as_ref()
    }

    pub fn logger(&self) -> &dyn InvocationLogger {
        self.logger.as_ref()
    }

    pub fn config(&self) -> &ToolingConfig {
        &self.config
    }

    /// Tools for `entity`, through its view or its own operations
    pub fn tools_for(
        self: &Arc<Self>,
        entity: &dyn Entity,
    ) -> Result<Vec<Arc<dyn EntityTool>>, ConfigurationError> {
        ToolSynthesizer::new(Arc::clone(self)).tools_for(entity)
    }

    /// A fresh finder for `entity_type`
    pub fn finder(
        self: &Arc<Self>,
        entity_type: EntityType,
    ) -> Result<FinderTool, ConfigurationError> {
        FinderTool::new(Arc::clone(self), entity_type)
    }
}
