// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Pre-run validation chain
//!
//! Every command declares the services it talks to. Before the command body
//! runs, a [`PreRunChain`] built from those declarations resolves and
//! validates each service's endpoint in registration order and stops at the
//! first failure. Commands never see an endpoint that has not been
//! validated.
//!
//! A chain belongs to exactly one command invocation. Nothing is shared
//! between commands, so running one command never re-runs another
//! command's checks.

use super::error::ConfigError;
use super::resolve::{
    resolve, Service, ServiceEndpoint, ServiceEnv, ServiceFlags,
};
use super::validation::validate;
use super::Config;
use log::debug;

/// Endpoints produced by a successful chain run
#[derive(Debug, Default, Clone)]
pub struct ValidatedEndpoints {
    bbs: Option<ServiceEndpoint>,
    locket: Option<ServiceEndpoint>,
}

impl ValidatedEndpoints {
    fn insert(&mut self, endpoint: ServiceEndpoint) {
        match endpoint.service {
            Service::Bbs => self.bbs = Some(endpoint),
            Service::Locket => self.locket = Some(endpoint),
        }
    }

    /// The validated endpoint for `service`
    ///
    /// Asking for a service whose hook was never registered reports the
    /// address as missing.
    pub fn get(&self, service: Service) -> Result<&ServiceEndpoint, ConfigError> {
        let endpoint = match service {
            Service::Bbs => self.bbs.as_ref(),
            Service::Locket => self.locket.as_ref(),
        };
        endpoint.ok_or(ConfigError::MissingAddress { service })
    }
}

/// A single step of a [`PreRunChain`]
pub trait PreRunHook {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Run the step against the process configuration
    fn run(
        &self,
        config: &Config,
        endpoints: &mut ValidatedEndpoints,
    ) -> Result<(), ConfigError>;
}

/// Resolves and validates the endpoint of one service
#[derive(Debug, Clone)]
pub struct ServiceHook {
    service: Service,
    flags: ServiceFlags,
    env: ServiceEnv,
}

impl ServiceHook {
    pub fn new(service: Service, flags: ServiceFlags, env: ServiceEnv) -> Self {
        Self {
            service,
            flags,
            env,
        }
    }

    /// Hook reading the service's variables from the process environment
    pub fn from_process(
        service: Service,
        flags: ServiceFlags,
    ) -> Result<Self, ConfigError> {
        let env = ServiceEnv::from_process(service)?;
        Ok(Self::new(service, flags, env))
    }
}

impl PreRunHook for ServiceHook {
    fn name(&self) -> &'static str {
        self.service.name()
    }

    fn run(
        &self,
        config: &Config,
        endpoints: &mut ValidatedEndpoints,
    ) -> Result<(), ConfigError> {
        let endpoint = resolve(self.service, &self.flags, &self.env, &config.tls)?;
        validate(&endpoint)?;
        endpoints.insert(endpoint);
        Ok(())
    }
}

/// Ordered list of pre-run hooks for one command
pub struct PreRunChain<'a> {
    config: &'a Config,
    hooks: Vec<Box<dyn PreRunHook + 'a>>,
}

impl<'a> PreRunChain<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            hooks: Vec::new(),
        }
    }

    /// Append a hook
    ///
    /// Registering the same service twice runs its checks twice.
    pub fn register<H: PreRunHook + 'a>(&mut self, hook: H) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Run all hooks in registration order, stopping at the first error
    pub fn run(&self) -> Result<ValidatedEndpoints, ConfigError> {
        let mut endpoints = ValidatedEndpoints::default();

        for hook in &self.hooks {
            debug!("Running pre-run hook: {}", hook.name());
            hook.run(self.config, &mut endpoints)?;
        }

        Ok(endpoints)
    }
}
