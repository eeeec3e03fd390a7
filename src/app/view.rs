use super::messages::Message;
use super::state::{App, Phase, TEXT_SCROLL_ID};
use crate::config::{
    Background, FontFamily, FontWeight, MAX_FONT_SIZE, MAX_LETTER_SPACING, MAX_LINE_SPACING,
    MAX_MARGIN, MAX_WORD_SPACING, MIN_FONT_SIZE, MIN_LINE_SPACING, Rgb, ThemeMode,
};
use iced::alignment::Vertical;
use iced::font::{Family, Weight};
use iced::widget::text::LineHeight;
use iced::widget::{
    Column, Space, button, center, column, container, horizontal_space, mouse_area, pick_list,
    row, scrollable, slider, stack, text,
};
use iced::{Color, Element, Font, Length, Theme};

const DRAWER_WIDTH: f32 = 280.0;
const TOC_INDENT_PX: f32 = 14.0;
const PANEL_HEIGHT: f32 = 320.0;

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        match self.phase() {
            Phase::Created | Phase::Loaded => center(text("Opening book...")).into(),
            Phase::Failed(error) => self.failure_view(error),
            Phase::Ready | Phase::Configuring | Phase::Destroyed => self.reader_view(),
        }
    }

    pub fn theme(&self) -> Theme {
        match self.config.theme {
            ThemeMode::Day => Theme::Light,
            ThemeMode::Night => Theme::Dark,
        }
    }

    fn failure_view(&self, error: &str) -> Element<'_, Message> {
        let body = column![
            text("This book could not be opened.").size(22.0),
            text(error.to_string()),
            row![
                button("Retry").on_press(Message::RetryLoad),
                button("Close").on_press(Message::CloseBook),
            ]
            .spacing(10),
        ]
        .spacing(12)
        .max_width(640);
        center(body).padding(24).into()
    }

    fn reader_view(&self) -> Element<'_, Message> {
        let total = self.pager.len().max(1);
        let chapter_label = format!("Chapter {} of {}", self.pager.current() + 1, total);

        let prev_button = if self.pager.has_previous() {
            button("Previous").on_press(Message::PreviousPage)
        } else {
            button("Previous")
        };
        let next_button = if self.pager.has_next() {
            button("Next").on_press(Message::NextPage)
        } else {
            button("Next")
        };
        let settings_label = if self.panel.is_dragged_above_limit() {
            "Hide Settings"
        } else {
            "Settings"
        };

        let controls = row![
            button("Contents").on_press(Message::ToggleDrawer),
            prev_button,
            next_button,
            text(chapter_label),
            horizontal_space(),
            button(settings_label).on_press(Message::ToggleSettings),
            button("Close Book").on_press(Message::CloseBook),
        ]
        .spacing(10)
        .padding(8)
        .align_y(Vertical::Center);

        let mut page: Element<'_, Message> = self.page_view();
        if self.shadow_alpha > 0.0 {
            let alpha = self.shadow_alpha;
            let shadow = mouse_area(
                container(Space::new(Length::Fill, Length::Fill)).style(move |_theme: &Theme| {
                    container::Style {
                        background: Some(Color { a: alpha, ..Color::BLACK }.into()),
                        ..container::Style::default()
                    }
                }),
            )
            .on_press(Message::ShadowClicked);
            page = stack![page, shadow].into();
        }

        let mut body = row![].height(Length::Fill);
        if self.drawer_open {
            body = body.push(self.toc_drawer());
        }
        body = body.push(page);

        column![controls, body, self.settings_panel()].into()
    }

    fn toc_drawer(&self) -> Element<'_, Message> {
        let entries = self
            .session
            .as_ref()
            .map(|session| session.toc())
            .unwrap_or_default();

        let list: Element<'_, Message> = if entries.is_empty() {
            text("No table of contents").into()
        } else {
            let current = self.pager.current();
            Column::with_children(entries.iter().enumerate().map(|(idx, entry)| {
                let indent = Space::with_width(Length::Fixed(entry.depth as f32 * TOC_INDENT_PX));
                let label = row![indent, text(entry.title.as_str())];
                let item = button(label)
                    .width(Length::Fill)
                    .style(if entry.spine_position == Some(current) {
                        button::primary
                    } else {
                        button::text
                    });
                match entry.spine_position {
                    Some(_) => item.on_press(Message::TocSelected(idx)).into(),
                    None => item.into(),
                }
            }))
            .spacing(2)
            .into()
        };

        let (background, dark) = (self.background, self.config.background.is_dark());
        container(scrollable(list).height(Length::Fill))
            .width(Length::Fixed(DRAWER_WIDTH))
            .height(Length::Fill)
            .padding(8)
            .style(move |_theme: &Theme| surface(background, dark))
            .into()
    }

    fn page_view(&self) -> Element<'_, Message> {
        let current = self.pager.current();
        let content: Element<'_, Message> = if let Some(page) = self.pager.page(current) {
            text(page.text.as_str())
                .size(self.config.font_size as f32)
                .line_height(LineHeight::Relative(self.config.line_spacing))
                .font(self.current_font())
                .width(Length::Fill)
                .into()
        } else if let Some(error) = self.pager.error(current) {
            column![
                text(format!("Could not read this chapter: {error}")),
                button("Retry").on_press(Message::RetryChapter(current)),
            ]
            .spacing(10)
            .into()
        } else {
            text("Loading chapter...").into()
        };

        let (background, dark) = (self.background, self.config.background.is_dark());
        let scroller = scrollable(container(content).padding(self.config.margin))
            .id(TEXT_SCROLL_ID.clone())
            .on_scroll(|viewport| Message::Scrolled(viewport.relative_offset().y))
            .height(Length::Fill)
            .width(Length::Fill);

        container(scroller)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_theme: &Theme| surface(background, dark))
            .into()
    }

    fn settings_panel(&self) -> Element<'_, Message> {
        if self.panel.is_hidden() {
            return Space::with_height(Length::Fixed(0.0)).into();
        }

        let handle = row![
            text("Settings"),
            slider(0.0..=1.0, self.panel.offset(), Message::PanelDragged).step(0.01),
        ]
        .spacing(12)
        .padding(8)
        .align_y(Vertical::Center);

        let mut panel = column![handle];
        let offset = self.panel.offset();
        if offset > 0.0 {
            panel = panel.push(
                container(scrollable(self.settings_controls()))
                    .height(Length::Fixed(PANEL_HEIGHT * offset))
                    .clip(true),
            );
        }
        panel.into()
    }

    fn settings_controls(&self) -> Element<'_, Message> {
        let swatches = Background::ALL.iter().fold(row![].spacing(6), |row, &bg| {
            let swatch = button(text(bg.to_string())).on_press(Message::BackgroundChanged(bg));
            row.push(if bg == self.panel.background() {
                swatch.style(button::primary)
            } else {
                swatch.style(button::secondary)
            })
        });

        let theme_label = match self.config.theme {
            ThemeMode::Day => "Night Mode",
            ThemeMode::Night => "Day Mode",
        };

        column![
            row![text("Background"), swatches]
                .spacing(8)
                .align_y(Vertical::Center),
            button(theme_label).on_press(Message::ToggleTheme),
            row![
                text(format!("Font size: {}", self.config.font_size)),
                slider(
                    MIN_FONT_SIZE as f32..=MAX_FONT_SIZE as f32,
                    self.config.font_size as f32,
                    |value| Message::FontSizeChanged(value.round() as u32),
                ),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text("Font family"),
                pick_list(
                    FontFamily::ALL,
                    Some(self.config.font_family),
                    Message::FontFamilyChanged
                ),
                text("Weight"),
                pick_list(
                    FontWeight::ALL,
                    Some(self.config.font_weight),
                    Message::FontWeightChanged
                ),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text(format!("Line spacing: {:.1}", self.config.line_spacing)),
                slider(
                    MIN_LINE_SPACING..=MAX_LINE_SPACING,
                    self.config.line_spacing,
                    Message::LineSpacingChanged,
                )
                .step(0.1),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text(format!("Margins: {} px", self.config.margin)),
                slider(
                    0.0..=MAX_MARGIN as f32,
                    self.config.margin as f32,
                    |value| Message::MarginChanged(value.round() as u16),
                ),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text(format!("Word spacing: {}", self.config.word_spacing)),
                slider(
                    0.0..=MAX_WORD_SPACING as f32,
                    self.config.word_spacing as f32,
                    |value| Message::WordSpacingChanged(value.round() as u32),
                ),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text(format!("Letter spacing: {}", self.config.letter_spacing)),
                slider(
                    0.0..=MAX_LETTER_SPACING as f32,
                    self.config.letter_spacing as f32,
                    |value| Message::LetterSpacingChanged(value.round() as u32),
                ),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            button("Apply").on_press(Message::ConfigChanged),
        ]
        .spacing(12)
        .padding(12)
        .into()
    }

    fn current_font(&self) -> Font {
        let family = match self.config.font_family {
            FontFamily::Serif => Family::Serif,
            FontFamily::Sans => Family::SansSerif,
            FontFamily::Monospace => Family::Monospace,
        };
        let weight = match self.config.font_weight {
            FontWeight::Light => Weight::Light,
            FontWeight::Normal => Weight::Normal,
            FontWeight::Bold => Weight::Bold,
        };
        Font {
            family,
            weight,
            ..Font::DEFAULT
        }
    }
}

fn surface(rgb: Rgb, dark: bool) -> container::Style {
    let text_color = if dark {
        Color::from_rgb(0.92, 0.92, 0.90)
    } else {
        Color::from_rgb(0.10, 0.10, 0.10)
    };
    container::Style {
        background: Some(Color::from_rgb(rgb.r, rgb.g, rgb.b).into()),
        text_color: Some(text_color),
        ..container::Style::default()
    }
}
