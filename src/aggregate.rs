use crate::catalog::CakeSize;
use crate::classify::classify;
use crate::dates::{current_week_range_at, format_ddmm, is_date_string_past_at, week_ordinal};
use crate::models::{DaySummaryEntry, ProcessedOrder, RawOrder, WeekBoard, WeekBucket, WeekDay};
use crate::transform::line_items;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub fn build_board(orders: &[RawOrder]) -> WeekBoard {
    build_board_at(orders, Utc::now())
}

pub fn build_board_at(orders: &[RawOrder], now: DateTime<Utc>) -> WeekBoard {
    WeekBoard {
        week_number: week_ordinal(now.date_naive()),
        generated_at: now,
        buckets: build_buckets_at(orders, now),
    }
}

pub fn build_buckets(orders: &[RawOrder]) -> BTreeMap<WeekDay, WeekBucket> {
    build_buckets_at(orders, Utc::now())
}

pub fn build_buckets_at(orders: &[RawOrder], now: DateTime<Utc>) -> BTreeMap<WeekDay, WeekBucket> {
    let week = current_week_range_at(now);

    let mut buckets: BTreeMap<WeekDay, WeekBucket> = WeekDay::ALL
        .iter()
        .zip(&week.labels)
        .map(|(day, label)| {
            let bucket = WeekBucket {
                orders: Vec::new(),
                summary: Vec::new(),
                display_date: label.clone(),
                is_past: is_date_string_past_at(label, now),
            };
            (*day, bucket)
        })
        .collect();

    for order in orders {
        let (Some(client), Some(start)) = (order.client(), order.delivery_start()) else {
            debug!("skipping order without client or delivery start");
            continue;
        };

        let classified = match classify(start, &week) {
            Ok(Some(classified)) => classified,
            Ok(None) => continue,
            Err(err) => {
                warn!(client, "skipping order: {err}");
                continue;
            }
        };

        let items = line_items(order);
        if items.is_empty() {
            debug!(client, "skipping order without cakes");
            continue;
        }

        if let Some(bucket) = buckets.get_mut(&classified.day) {
            bucket.orders.push(ProcessedOrder {
                client: client.to_string(),
                line_items: items,
                original_delivery: start.to_string(),
                formatted_date: format_ddmm(classified.date),
            });
        }
    }

    for bucket in buckets.values_mut() {
        bucket.summary = summarize(&bucket.orders);
    }

    buckets
}

pub fn summarize(orders: &[ProcessedOrder]) -> Vec<DaySummaryEntry> {
    let mut summary: Vec<DaySummaryEntry> = Vec::new();

    for item in orders.iter().flat_map(|order| &order.line_items) {
        let index = match summary
            .iter()
            .position(|entry| entry.base_type == item.base_type)
        {
            Some(index) => index,
            None => {
                summary.push(DaySummaryEntry {
                    base_type: item.base_type,
                    abbreviation: item
                        .abbreviation
                        .split(' ')
                        .next()
                        .unwrap_or(item.abbreviation),
                    color: item.color,
                    small_count: 0,
                    large_count: 0,
                });
                summary.len() - 1
            }
        };

        let entry = &mut summary[index];
        match item.size {
            CakeSize::Small => entry.small_count = entry.small_count.saturating_add(item.quantity),
            CakeSize::Large => entry.large_count = entry.large_count.saturating_add(item.quantity),
        }
    }

    summary
}
