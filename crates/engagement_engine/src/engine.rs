//! The engagement engine
//!
//! Owns the in-memory store and wires the cascade together: task status
//! changes feed the completion aggregator, completion effects feed the
//! invoice generator, and invoice status changes feed the posting state
//! machine. Downstream billing failures are logged and never abort the
//! status write that triggered them; the cascade can be replayed once the
//! configuration gap is fixed.

use std::collections::HashMap;

use chrono::NaiveDate;

use core_kernel::{CustomerId, InvoiceId, PeriodId, ServiceId, TaskId, WorkId};
use domain_billing::{
    apply_status_change, generate_for_period, generate_for_work, Account, BillingContext,
    CompanySettings, Customer, Invoice, InvoiceStatus, Ledger, PostingEffect, ServiceOffering,
    TrialBalance, VoucherRegister,
};
use domain_schedule::{
    backfill, set_task_status, set_work_task_status, BackfillOutcome, CompletionEffect,
    ServiceTaskTemplate, TaskStatus, Work, WorkSchedule, WorkTask,
};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// In-memory engagement store and cascade pipeline
///
/// "Now" is always an explicit `today` parameter; the engine never reads
/// the wall clock for business dates.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    settings: CompanySettings,
    schedules: HashMap<WorkId, WorkSchedule>,
    templates: HashMap<ServiceId, Vec<ServiceTaskTemplate>>,
    customers: HashMap<CustomerId, Customer>,
    services: HashMap<ServiceId, ServiceOffering>,
    invoices: HashMap<InvoiceId, Invoice>,
    invoice_index: HashMap<(WorkId, Option<PeriodId>), InvoiceId>,
    ledger: Ledger,
    vouchers: VoucherRegister,
}

impl Engine {
    /// Creates an engine with the given configuration and settings
    ///
    /// The configured receipt deposit side overrides the one carried in
    /// the company settings.
    pub fn new(
        config: EngineConfig,
        mut settings: CompanySettings,
        currency: core_kernel::Currency,
    ) -> Self {
        settings.receipt_deposit = config.receipt_deposit;
        Self {
            config,
            settings,
            schedules: HashMap::new(),
            templates: HashMap::new(),
            customers: HashMap::new(),
            services: HashMap::new(),
            invoices: HashMap::new(),
            invoice_index: HashMap::new(),
            ledger: Ledger::new(currency),
            vouchers: VoucherRegister::new(),
        }
    }

    /// Adds an account to the ledger's chart of accounts
    pub fn add_account(&mut self, account: Account) -> Result<(), EngineError> {
        self.ledger.add_account(account)?;
        Ok(())
    }

    /// Registers a customer
    pub fn register_customer(&mut self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    /// Registers a service offering
    pub fn register_service(&mut self, service: ServiceOffering) {
        self.services.insert(service.id, service);
    }

    /// Replaces the task templates of a service
    pub fn set_templates(&mut self, service_id: ServiceId, templates: Vec<ServiceTaskTemplate>) {
        self.templates.insert(service_id, templates);
    }

    /// Updates the company settings
    pub fn set_settings(&mut self, settings: CompanySettings) {
        self.settings = settings;
    }

    /// Stores a work and backfills its periods when recurring
    ///
    /// A tripped backfill cap is reported in the outcome and logged, but
    /// never aborts work creation.
    pub fn create_work(&mut self, work: Work, today: NaiveDate) -> BackfillOutcome {
        let work_id = work.id;
        let schedule = WorkSchedule::new(work);
        self.schedules.insert(work_id, schedule);

        self.run_backfill(work_id, today)
    }

    /// Re-runs backfill for a work, picking up elapsed periods and
    /// template additions
    pub fn reevaluate_work(
        &mut self,
        work_id: WorkId,
        today: NaiveDate,
    ) -> Result<BackfillOutcome, EngineError> {
        if !self.schedules.contains_key(&work_id) {
            return Err(EngineError::WorkNotFound(work_id.to_string()));
        }
        Ok(self.run_backfill(work_id, today))
    }

    fn run_backfill(&mut self, work_id: WorkId, today: NaiveDate) -> BackfillOutcome {
        let schedule = match self.schedules.get_mut(&work_id) {
            Some(schedule) => schedule,
            None => {
                return BackfillOutcome {
                    periods_created: 0,
                    periods_visited: 0,
                    cap_exceeded: false,
                }
            }
        };

        let service_id = schedule.work.service_id;
        let templates = match self.templates.get(&service_id) {
            Some(templates) => templates.as_slice(),
            None => {
                if schedule.work.is_recurring {
                    tracing::warn!(
                        work = %work_id,
                        service = %service_id,
                        "no task templates registered for service"
                    );
                }
                &[]
            }
        };

        backfill(
            schedule,
            templates,
            today,
            self.config.eligibility,
            self.config.backfill_cap,
        )
    }

    /// Adds a direct task to a non-recurring work
    pub fn add_work_task(
        &mut self,
        work_id: WorkId,
        title: impl Into<String>,
    ) -> Result<TaskId, EngineError> {
        let schedule = self
            .schedules
            .get_mut(&work_id)
            .ok_or_else(|| EngineError::WorkNotFound(work_id.to_string()))?;
        let task = WorkTask::new(work_id, title);
        let id = task.id;
        schedule.insert_work_task(task);
        Ok(id)
    }

    /// Applies a status change to a period task and runs the cascade
    pub fn set_task_status(
        &mut self,
        work_id: WorkId,
        task_id: TaskId,
        status: TaskStatus,
        today: NaiveDate,
    ) -> Result<Vec<CompletionEffect>, EngineError> {
        let schedule = self
            .schedules
            .get_mut(&work_id)
            .ok_or_else(|| EngineError::WorkNotFound(work_id.to_string()))?;

        let effects = set_task_status(schedule, task_id, status, today)?;
        self.handle_completion_effects(work_id, &effects, today);
        Ok(effects)
    }

    /// Applies a status change to a direct work task and runs the cascade
    pub fn set_work_task_status(
        &mut self,
        work_id: WorkId,
        task_id: TaskId,
        status: TaskStatus,
        today: NaiveDate,
    ) -> Result<Vec<CompletionEffect>, EngineError> {
        let schedule = self
            .schedules
            .get_mut(&work_id)
            .ok_or_else(|| EngineError::WorkNotFound(work_id.to_string()))?;

        let effects = set_work_task_status(schedule, task_id, status, today)?;
        self.handle_completion_effects(work_id, &effects, today);
        Ok(effects)
    }

    /// Runs the billing side of the cascade for completion transitions
    fn handle_completion_effects(
        &mut self,
        work_id: WorkId,
        effects: &[CompletionEffect],
        today: NaiveDate,
    ) {
        for effect in effects {
            match effect {
                CompletionEffect::PeriodCompleted(period_id) => {
                    self.bill_period(work_id, *period_id, today);
                }
                CompletionEffect::WorkCompleted(completed_id) => {
                    let recurring = self
                        .schedules
                        .get(completed_id)
                        .map(|s| s.work.is_recurring)
                        .unwrap_or(false);
                    // Recurring works are billed per period, not as a whole.
                    if !recurring {
                        self.bill_work(*completed_id, today);
                    }
                }
                CompletionEffect::PeriodReopened(_) | CompletionEffect::WorkReopened(_) => {}
            }
        }
    }

    fn bill_period(&mut self, work_id: WorkId, period_id: PeriodId, today: NaiveDate) {
        if self.invoice_index.contains_key(&(work_id, Some(period_id))) {
            tracing::debug!(period = %period_id, "invoice already exists for period");
            return;
        }
        let Some(schedule) = self.schedules.get_mut(&work_id) else {
            return;
        };
        let customer_id = schedule.work.customer_id;
        let service_id = schedule.work.service_id;
        let Some(customer) = self.customers.get(&customer_id) else {
            tracing::warn!(work = %work_id, customer = %customer_id, "customer not registered, skipping invoice");
            return;
        };
        let Some(service) = self.services.get(&service_id) else {
            tracing::warn!(work = %work_id, service = %service_id, "service not registered, skipping invoice");
            return;
        };
        let ctx = BillingContext {
            customer,
            service,
            settings: &self.settings,
        };

        let (work, period) = schedule.work_and_period_mut(period_id);
        let Some(period) = period else {
            tracing::warn!(work = %work_id, period = %period_id, "period missing, skipping invoice");
            return;
        };
        if let Some(invoice) = generate_for_period(work, period, &ctx, today) {
            self.invoice_index.insert((work_id, Some(period_id)), invoice.id);
            self.invoices.insert(invoice.id, invoice);
        }
    }

    fn bill_work(&mut self, work_id: WorkId, today: NaiveDate) {
        if self.invoice_index.contains_key(&(work_id, None)) {
            tracing::debug!(work = %work_id, "invoice already exists for work");
            return;
        }
        let Some(schedule) = self.schedules.get_mut(&work_id) else {
            return;
        };
        let customer_id = schedule.work.customer_id;
        let service_id = schedule.work.service_id;
        let Some(customer) = self.customers.get(&customer_id) else {
            tracing::warn!(work = %work_id, customer = %customer_id, "customer not registered, skipping invoice");
            return;
        };
        let Some(service) = self.services.get(&service_id) else {
            tracing::warn!(work = %work_id, service = %service_id, "service not registered, skipping invoice");
            return;
        };
        let ctx = BillingContext {
            customer,
            service,
            settings: &self.settings,
        };

        if let Some(invoice) = generate_for_work(&mut schedule.work, &ctx, today) {
            self.invoice_index.insert((work_id, None), invoice.id);
            self.invoices.insert(invoice.id, invoice);
        }
    }

    /// Applies an invoice status change through the posting state machine
    pub fn set_invoice_status(
        &mut self,
        invoice_id: InvoiceId,
        status: InvoiceStatus,
        today: NaiveDate,
    ) -> Result<Vec<PostingEffect>, EngineError> {
        let invoice = self
            .invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| EngineError::InvoiceNotFound(invoice_id.to_string()))?;

        let mut scratch;
        let customer = match self.customers.get_mut(&invoice.customer_id) {
            Some(customer) => customer,
            None => {
                tracing::warn!(
                    invoice = %invoice_id,
                    customer = %invoice.customer_id,
                    "customer not registered, account backfill will be lost"
                );
                scratch = Customer::new("unregistered");
                &mut scratch
            }
        };

        let effects = apply_status_change(
            invoice,
            status,
            &mut self.ledger,
            &mut self.vouchers,
            customer,
            &self.settings,
            today,
        )?;
        Ok(effects)
    }

    /// Looks up the schedule of a work
    pub fn schedule(&self, work_id: WorkId) -> Option<&WorkSchedule> {
        self.schedules.get(&work_id)
    }

    /// Looks up a work
    pub fn work(&self, work_id: WorkId) -> Option<&Work> {
        self.schedules.get(&work_id).map(|s| &s.work)
    }

    /// Looks up an invoice
    pub fn invoice(&self, invoice_id: InvoiceId) -> Option<&Invoice> {
        self.invoices.get(&invoice_id)
    }

    /// Finds the invoice for a work period, or for the work itself when
    /// `period_id` is None
    pub fn invoice_for(&self, work_id: WorkId, period_id: Option<PeriodId>) -> Option<&Invoice> {
        self.invoice_index
            .get(&(work_id, period_id))
            .and_then(|id| self.invoices.get(id))
    }

    /// Returns the ledger for report queries
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Returns the voucher register
    pub fn vouchers(&self) -> &VoucherRegister {
        &self.vouchers
    }

    /// Generates a trial balance over the ledger
    pub fn trial_balance(&self) -> TrialBalance {
        self.ledger.trial_balance()
    }

    /// Looks up a registered customer
    pub fn customer(&self, customer_id: CustomerId) -> Option<&Customer> {
        self.customers.get(&customer_id)
    }
}
