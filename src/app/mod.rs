//! Headless view state
//!
//! Each page is a state struct with a `Message` enum and an `update`
//! function. [`State`] owns the pages, routes messages to the active one and
//! turns page outcomes into navigation and [`Command`]s. Commands describe
//! the data a page needs; [`perform`] runs them against a [`DataSource`] and
//! yields the message that settles them.

pub mod carousel;
pub mod catalogue;
pub mod deals;
pub mod forms;
pub mod helpers;
pub mod product;
pub mod profile;
pub mod registration;

use crate::config::AppConfig;
use crate::core::discount::{self, DiscountGrant, WheelSpin};
use crate::core::entity::UserProfile;
use crate::core::error::{Error, Result};
use crate::core::scheduler::Scheduler;
use crate::core::source::DataSource;
use crate::core::store::KeyValueStore;
use carousel::{CarouselTimer, CategoryBrowser};
use catalogue::CatalogueView;
use chrono::{DateTime, Utc};
use deals::DealTracker;
use forms::Registration;
use product::ProductDetail;
use profile::ProfileEditor;
use rand::Rng;
use registration::RegistrationWizard;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Catalogue,
    Product,
    Deal,
    Profile,
    Register,
}

#[derive(Debug)]
pub enum Message {
    Carousel(carousel::Message),
    Catalogue(catalogue::Message),
    Product(product::Message),
    Deals(deals::Message),
    Profile(profile::Message),
    Registration(registration::Message),
    /// Open the full catalogue, or one sub-category of it
    OpenCatalogue(Option<u64>),
    OpenDeal(u64),
    Navigate(Page),
}

/// Data a page asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    None,
    FetchCategories,
    FetchProducts,
    FetchDeals { client_id: u64 },
    FetchProfile,
    SaveProfile(UserProfile),
    SubmitRegistration(Registration),
    Batch(Vec<Command>),
}

pub struct State<S: KeyValueStore> {
    config: AppConfig,
    store: S,
    page: Page,
    carousel: CategoryBrowser,
    catalogue: Option<CatalogueView>,
    product: Option<ProductDetail>,
    deal: Option<DealTracker>,
    profile: ProfileEditor,
    registration: RegistrationWizard,
    grant: Option<DiscountGrant>,
}

impl<S: KeyValueStore> State<S> {
    /// Builds the home page and asks for categories and the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if an expired discount cannot be cleared from the
    /// store.
    pub fn new(
        config: AppConfig,
        mut store: S,
        width: u32,
        now: DateTime<Utc>,
    ) -> Result<(Self, Command)> {
        let grant = discount::active_grant(&mut store, now)?;
        let state = Self {
            carousel: CategoryBrowser::new(config.carousel_settings(), width),
            config,
            store,
            page: Page::Home,
            catalogue: None,
            product: None,
            deal: None,
            profile: ProfileEditor::new(),
            registration: RegistrationWizard::new(),
            grant,
        };
        Ok((
            state,
            Command::Batch(vec![Command::FetchCategories, Command::FetchProfile]),
        ))
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn carousel(&self) -> &CategoryBrowser {
        &self.carousel
    }

    pub fn catalogue(&self) -> Option<&CatalogueView> {
        self.catalogue.as_ref()
    }

    pub fn product(&self) -> Option<&ProductDetail> {
        self.product.as_ref()
    }

    pub fn deal(&self) -> Option<&DealTracker> {
        self.deal.as_ref()
    }

    pub fn profile(&self) -> &ProfileEditor {
        &self.profile
    }

    pub fn registration(&self) -> &RegistrationWizard {
        &self.registration
    }

    pub fn grant(&self) -> Option<&DiscountGrant> {
        self.grant.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn update(
        &mut self,
        message: Message,
        scheduler: &mut dyn Scheduler<CarouselTimer>,
        now: DateTime<Utc>,
    ) -> Command {
        match message {
            Message::Carousel(msg) => match self.carousel.update(msg, scheduler) {
                carousel::Outcome::None => Command::None,
                carousel::Outcome::OpenProducts {
                    sub_category_id,
                    title,
                } => {
                    tracing::debug!("Opening sub-category {sub_category_id} ({title})");
                    self.open_catalogue(Some(sub_category_id))
                }
            },
            Message::Catalogue(msg) => {
                let Some(view) = &mut self.catalogue else {
                    return Command::None;
                };
                match view.update(msg) {
                    catalogue::Outcome::None => Command::None,
                    catalogue::Outcome::OpenProduct {
                        product_id,
                        via_sub_category,
                    } => {
                        self.product = Some(ProductDetail::new(
                            product_id,
                            via_sub_category,
                            self.config.product_settings(),
                            &self.store,
                        ));
                        self.page = Page::Product;
                        Command::FetchProducts
                    }
                }
            }
            Message::Product(msg) => {
                if let Some(detail) = &mut self.product {
                    detail.update(msg, &mut self.store, now);
                }
                Command::None
            }
            Message::Deals(msg) => {
                if let Some(tracker) = &mut self.deal {
                    tracker.update(msg);
                }
                Command::None
            }
            Message::Profile(msg) => match self.profile.update(msg) {
                profile::Outcome::None => Command::None,
                profile::Outcome::Save(updated) => Command::SaveProfile(updated),
            },
            Message::Registration(msg) => match self.registration.update(msg) {
                registration::Outcome::None => Command::None,
                registration::Outcome::Submitted(registration) => {
                    Command::SubmitRegistration(registration)
                }
            },
            Message::OpenCatalogue(sub_category) => self.open_catalogue(sub_category),
            Message::OpenDeal(offer_id) => {
                let Some(client_id) = self.profile.profile().map(|p| p.client_id) else {
                    tracing::warn!("Cannot open offer {offer_id} without a signed-in profile");
                    return Command::None;
                };
                self.deal = Some(DealTracker::new(client_id, offer_id));
                self.page = Page::Deal;
                Command::FetchDeals { client_id }
            }
            Message::Navigate(page) => {
                self.page = page;
                match page {
                    Page::Profile => Command::FetchProfile,
                    Page::Home => Command::FetchCategories,
                    _ => Command::None,
                }
            }
        }
    }

    fn open_catalogue(&mut self, sub_category: Option<u64>) -> Command {
        let settings = self.config.catalogue_settings();
        let view = match sub_category {
            Some(id) => CatalogueView::for_sub_category(settings, id),
            None => CatalogueView::new(settings),
        };
        match view {
            Ok(mut view) => {
                view.update(catalogue::Message::GrantChanged(self.grant));
                self.catalogue = Some(view);
                self.page = Page::Catalogue;
                Command::FetchProducts
            }
            Err(e) => {
                tracing::warn!("Cannot open catalogue: {e}");
                Command::None
            }
        }
    }

    /// Spins the discount wheel and applies the win to the catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the wheel has no options or the grant cannot be
    /// stored.
    pub fn spin_wheel<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<WheelSpin> {
        let spin = discount::spin(&self.config.wheel_options, rng)?;
        let grant = discount::grant(
            &mut self.store,
            spin.percent,
            now,
            self.config.grant_lifetime(),
        )?;
        self.grant = Some(grant);
        if let Some(view) = &mut self.catalogue {
            view.update(catalogue::Message::GrantChanged(self.grant));
        }
        Ok(spin)
    }

    /// Drops the wheel discount once it has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the expired grant cannot be removed.
    pub fn expire_grant(&mut self, now: DateTime<Utc>) -> Result<()> {
        let grant = discount::active_grant(&mut self.store, now)?;
        if grant != self.grant {
            self.grant = grant;
            if let Some(view) = &mut self.catalogue {
                view.update(catalogue::Message::GrantChanged(self.grant));
            }
        }
        Ok(())
    }
}

/// Runs `command` against `source` and returns the messages that settle it.
pub async fn perform<D: DataSource>(source: &D, command: Command) -> Vec<Message> {
    let mut pending = vec![command];
    let mut messages = Vec::new();
    while let Some(command) = pending.pop() {
        match command {
            Command::None => {}
            Command::FetchCategories => messages.push(Message::Carousel(
                carousel::Message::Loaded(source.categories().await),
            )),
            Command::FetchProducts => {
                let products = source.products().await;
                messages.push(Message::Catalogue(catalogue::Message::Loaded(
                    clone_result(&products),
                )));
                messages.push(Message::Product(product::Message::Loaded(products)));
            }
            Command::FetchDeals { client_id } => messages.push(Message::Deals(
                deals::Message::Loaded(source.deals(client_id).await),
            )),
            Command::FetchProfile => messages.push(Message::Profile(profile::Message::Loaded(
                source.profile().await,
            ))),
            // The backend is external; a save echoes the submitted profile
            Command::SaveProfile(updated) => messages.push(Message::Profile(
                profile::Message::Saved(Ok(Arc::new(updated))),
            )),
            Command::SubmitRegistration(registration) => {
                tracing::info!("Registration for {} handed to the backend", registration.email);
            }
            Command::Batch(commands) => pending.extend(commands.into_iter().rev()),
        }
    }
    messages
}

/// Shares one fetch result between two pages
fn clone_result<T: ?Sized>(result: &Result<Arc<T>>) -> Result<Arc<T>> {
    match result {
        Ok(value) => Ok(Arc::clone(value)),
        Err(Error::Fetch(msg)) => Err(Error::Fetch(msg.clone())),
        Err(e) => Err(Error::Fetch(e.to_string())),
    }
}
