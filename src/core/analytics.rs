//! Analytics aggregation - time-bucketed revenue series and product rankings.
//!
//! The aggregation core is pure: callers hand in sale/product slices and a "now" in
//! whatever time zone the charts should use, so everything is deterministic under
//! test. The [`crate::store::Stockbook`] wrappers pass `Local::now()`, matching the
//! calendar the shop owner lives in. Weeks start on Monday everywhere a week boundary
//! appears.
//!
//! Bucket intervals are inclusive on both ends, with each end placed one millisecond
//! before the next bucket's start, so every sale timestamp lands in exactly one
//! bucket: no double counting, no omission. Buckets with no sales still appear with a
//! zero total - charts need dense series to render continuous axes.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::{
    models::{Product, ProductType, Sale},
    store::Stockbook,
};

/// How many ranked products a performance report returns.
pub const TOP_PRODUCT_LIMIT: usize = 10;

/// Chartable reporting windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timeframe {
    /// The current day in 24 hourly buckets, fixed regardless of data
    Daily,
    /// The last 7 calendar days ending today, one bucket per day
    Weekly,
    /// The 1st of the current month through today, one bucket per day
    Monthly,
    /// The last 90 days in Monday-start calendar weeks
    Last3Months,
    /// The last 180 days in Monday-start calendar weeks
    Last6Months,
    /// January through the current month, one bucket per month, clipped to today
    Yearly,
}

/// One time bucket of a revenue series.
#[derive(Clone, Debug, PartialEq)]
pub struct RevenueBucket {
    /// Axis label for charting
    pub label: String,
    /// Inclusive start of the bucket, in the caller's calendar
    pub start: NaiveDateTime,
    /// Inclusive end of the bucket
    pub end: NaiveDateTime,
    /// Sum of `total_amount` over sales falling inside the bucket
    pub total_sales: f64,
}

/// Aggregated performance of one product over a timeframe.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductPerformance {
    /// The product's id (possibly dangling if the product was deleted)
    pub product_id: String,
    /// Display name, resolved from the sale snapshots first
    pub name: String,
    /// Unit of measure, from the sale snapshots
    pub product_type: ProductType,
    /// Total quantity sold in the timeframe
    pub quantity_sold: f64,
    /// Total profit: `(retail - wholesale) * quantity`, summed over matching items
    pub profit: f64,
}

/// The Monday on or before `date`. This is the single week-start convention used by
/// week-bucketed timeframes and the backup period.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn day_end(date: NaiveDate) -> NaiveDateTime {
    day_start(date) + Duration::days(1) - Duration::milliseconds(1)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.ordinal0()))
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    // Adding 32 days to a month's first day always lands in the following month
    first_of_month(first_of_month(date) + Duration::days(32))
}

fn bucket(label: String, start: NaiveDateTime, end: NaiveDateTime) -> RevenueBucket {
    RevenueBucket {
        label,
        start,
        end,
        total_sales: 0.0,
    }
}

/// The dense, zero-filled bucket grid for `timeframe` as of `today`.
fn empty_buckets(timeframe: Timeframe, today: NaiveDate) -> Vec<RevenueBucket> {
    let mut buckets = Vec::new();

    match timeframe {
        Timeframe::Daily => {
            for hour in 0..24 {
                let start = day_start(today) + Duration::hours(hour);
                buckets.push(bucket(
                    start.format("%H:00").to_string(),
                    start,
                    start + Duration::hours(1) - Duration::milliseconds(1),
                ));
            }
        }
        Timeframe::Weekly => {
            for offset in (0..7).rev() {
                let day = today - Duration::days(offset);
                buckets.push(bucket(
                    day.format("%a").to_string(),
                    day_start(day),
                    day_end(day),
                ));
            }
        }
        Timeframe::Monthly => {
            let mut day = first_of_month(today);
            while day <= today {
                buckets.push(bucket(
                    day.format("%b %d").to_string(),
                    day_start(day),
                    day_end(day),
                ));
                day += Duration::days(1);
            }
        }
        Timeframe::Last3Months | Timeframe::Last6Months => {
            let span_days = if timeframe == Timeframe::Last3Months {
                90
            } else {
                180
            };
            let mut week = week_start(today - Duration::days(span_days - 1));
            while week <= today {
                let end = day_end(week + Duration::days(6)).min(day_end(today));
                buckets.push(bucket(week.format("%b %d").to_string(), day_start(week), end));
                week += Duration::days(7);
            }
        }
        Timeframe::Yearly => {
            let mut month = first_of_year(today);
            while month <= today {
                let month_end = next_month_start(month) - Duration::days(1);
                let end = day_end(month_end).min(day_end(today));
                buckets.push(bucket(month.format("%b").to_string(), day_start(month), end));
                month = next_month_start(month);
            }
        }
    }

    buckets
}

/// The full inclusive interval `[first bucket start, last bucket end]` covered by
/// `timeframe` as of `today`.
#[must_use]
pub fn timeframe_interval(timeframe: Timeframe, today: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let buckets = empty_buckets(timeframe, today);
    let start = buckets.first().map_or_else(|| day_start(today), |b| b.start);
    let end = buckets.last().map_or_else(|| day_end(today), |b| b.end);
    (start, end)
}

/// Partitions `sales` into the timeframe's bucket grid and sums each bucket's
/// transaction totals. Every bucket of the grid appears in the result, zero-valued
/// when nothing matched.
pub fn revenue_series<Tz: TimeZone>(
    sales: &[Sale],
    timeframe: Timeframe,
    now: &DateTime<Tz>,
) -> Vec<RevenueBucket> {
    let tz = now.timezone();
    let mut series = empty_buckets(timeframe, now.date_naive());

    for sale in sales {
        let sold_at = sale.sold_at.with_timezone(&tz).naive_local();
        if let Some(bucket) = series
            .iter_mut()
            .find(|b| b.start <= sold_at && sold_at <= b.end)
        {
            bucket.total_sales += sale.total_amount;
        }
    }

    series
}

fn resolve_name(item_name: &str, product_id: &str, products: &[Product]) -> String {
    if !item_name.is_empty() {
        return item_name.to_string();
    }
    products
        .iter()
        .find(|p| p.id == product_id)
        .map_or_else(|| product_id.to_string(), |p| p.name.clone())
}

/// Ranks products by total profit over the timeframe's full interval.
///
/// Profit per item is `(retail - wholesale) * quantity` from the item's own price
/// snapshots; non-finite contributions count as zero rather than poisoning the sum.
/// Display names resolve from the item snapshot, falling back to the live product
/// when the snapshot is empty. The result is stable-sorted descending by profit and
/// holds at most [`TOP_PRODUCT_LIMIT`] entries; products with no matching sales never
/// appear.
pub fn top_products<Tz: TimeZone>(
    sales: &[Sale],
    products: &[Product],
    timeframe: Timeframe,
    now: &DateTime<Tz>,
) -> Vec<ProductPerformance> {
    let tz = now.timezone();
    let (start, end) = timeframe_interval(timeframe, now.date_naive());

    let mut performance: Vec<ProductPerformance> = Vec::new();
    for sale in sales {
        let sold_at = sale.sold_at.with_timezone(&tz).naive_local();
        if sold_at < start || sold_at > end {
            continue;
        }

        for item in &sale.items {
            let index = match performance
                .iter()
                .position(|p| p.product_id == item.product_id)
            {
                Some(index) => index,
                None => {
                    performance.push(ProductPerformance {
                        product_id: item.product_id.clone(),
                        name: resolve_name(&item.product_name, &item.product_id, products),
                        product_type: item.product_type,
                        quantity_sold: 0.0,
                        profit: 0.0,
                    });
                    performance.len() - 1
                }
            };

            let entry = &mut performance[index];
            if item.quantity_sold.is_finite() {
                entry.quantity_sold += item.quantity_sold;
            }
            let margin =
                (item.retail_price_per_unit - item.wholesale_price_per_unit) * item.quantity_sold;
            if margin.is_finite() {
                entry.profit += margin;
            }
        }
    }

    performance.sort_by(|a, b| {
        b.profit
            .partial_cmp(&a.profit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    performance.truncate(TOP_PRODUCT_LIMIT);
    performance
}

/// The revenue series for the current store state, bucketed in local calendar time.
#[must_use]
pub fn sales_over_time(app: &Stockbook, timeframe: Timeframe) -> Vec<RevenueBucket> {
    let sales = app.sales().snapshot();
    revenue_series(&sales, timeframe, &Local::now())
}

/// The product ranking for the current store state over the timeframe's interval.
#[must_use]
pub fn top_selling_products(app: &Stockbook, timeframe: Timeframe) -> Vec<ProductPerformance> {
    let sales = app.sales().snapshot();
    let products = app.products().snapshot();
    top_products(&sales, &products, timeframe, &Local::now())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::SaleItem;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn sale(sold_at: DateTime<Utc>, total: f64) -> Sale {
        Sale {
            id: Uuid::new_v4().to_string(),
            sold_at,
            items: Vec::new(),
            total_amount: total,
            created_at: sold_at,
            updated_at: sold_at,
        }
    }

    fn item(product_id: &str, name: &str, quantity: f64, wholesale: f64, retail: f64) -> SaleItem {
        SaleItem {
            id: Uuid::new_v4().to_string(),
            sale_id: "sale".to_string(),
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            product_type: ProductType::Unit,
            quantity_sold: quantity,
            wholesale_price_per_unit: wholesale,
            retail_price_per_unit: retail,
            item_total_amount: retail * quantity,
        }
    }

    fn sale_with_items(sold_at: DateTime<Utc>, items: Vec<SaleItem>) -> Sale {
        let mut sale = Sale {
            id: Uuid::new_v4().to_string(),
            sold_at,
            items,
            total_amount: 0.0,
            created_at: sold_at,
            updated_at: sold_at,
        };
        sale.recompute_totals();
        sale
    }

    #[test]
    fn test_daily_with_no_sales_is_24_zero_buckets() {
        let now = at(2026, 8, 5, 12, 0);

        let series = revenue_series(&[], Timeframe::Daily, &now);

        assert_eq!(series.len(), 24);
        assert!(series.iter().all(|b| b.total_sales == 0.0));
        assert_eq!(series[0].label, "00:00");
        assert_eq!(series[23].label, "23:00");
    }

    #[test]
    fn test_daily_buckets_sales_by_hour() {
        let now = at(2026, 8, 5, 18, 0);
        let sales = vec![
            sale(at(2026, 8, 5, 10, 15), 24.0),
            sale(at(2026, 8, 5, 10, 59), 16.0),
            sale(at(2026, 8, 5, 11, 0), 8.0),
            // Different day: excluded
            sale(at(2026, 8, 4, 10, 30), 99.0),
        ];

        let series = revenue_series(&sales, Timeframe::Daily, &now);

        assert_eq!(series[10].total_sales, 40.0);
        assert_eq!(series[11].total_sales, 8.0);
        let total: f64 = series.iter().map(|b| b.total_sales).sum();
        assert_eq!(total, 48.0);
    }

    #[test]
    fn test_weekly_is_last_seven_days_ending_today() {
        let now = at(2026, 8, 5, 12, 0);
        let sales = vec![
            sale(at(2026, 8, 5, 9, 0), 10.0),
            sale(at(2026, 8, 3, 9, 0), 20.0),
            // Eight days back: outside the window
            sale(at(2026, 7, 28, 9, 0), 40.0),
        ];

        let series = revenue_series(&sales, Timeframe::Weekly, &now);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].start, day_start(NaiveDate::from_ymd_opt(2026, 7, 30).unwrap()));
        assert_eq!(series[6].total_sales, 10.0);
        assert_eq!(series[4].total_sales, 20.0);
        let total: f64 = series.iter().map(|b| b.total_sales).sum();
        assert_eq!(total, 30.0);
    }

    #[test]
    fn test_monthly_runs_first_of_month_through_today() {
        let now = at(2026, 8, 5, 12, 0);

        let series = revenue_series(&[], Timeframe::Monthly, &now);

        assert_eq!(series.len(), 5);
        assert_eq!(series[0].label, "Aug 01");
        assert_eq!(series[4].label, "Aug 05");
    }

    #[test]
    fn test_quarter_buckets_are_monday_weeks_clipped_to_today() {
        // 2026-08-05 is a Wednesday; 90 days back is 2026-05-08 (Friday)
        let now = at(2026, 8, 5, 12, 0);

        let series = revenue_series(&[], Timeframe::Last3Months, &now);

        // Monday on or before May 8 is May 4
        assert_eq!(series[0].start, day_start(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()));
        assert_eq!(series.len(), 14);
        assert!(series.iter().all(|b| b.start.date().weekday() == chrono::Weekday::Mon));
        // The final week is clipped to the end of today
        assert_eq!(
            series.last().unwrap().end,
            day_end(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap())
        );
    }

    #[test]
    fn test_half_year_covers_180_days() {
        let now = at(2026, 8, 5, 12, 0);

        let series = revenue_series(&[], Timeframe::Last6Months, &now);

        // 180 days back is 2026-02-07; its Monday is 2026-02-02
        assert_eq!(series[0].start, day_start(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()));
        assert_eq!(series.len(), 27);
    }

    #[test]
    fn test_yearly_buckets_january_through_current_month() {
        let now = at(2026, 8, 5, 12, 0);
        let sales = vec![
            sale(at(2026, 1, 15, 9, 0), 100.0),
            sale(at(2026, 8, 2, 9, 0), 50.0),
            // Previous year: excluded
            sale(at(2025, 12, 31, 23, 59), 77.0),
        ];

        let series = revenue_series(&sales, Timeframe::Yearly, &now);

        assert_eq!(series.len(), 8);
        assert_eq!(series[0].label, "Jan");
        assert_eq!(series[0].total_sales, 100.0);
        assert_eq!(series[7].total_sales, 50.0);
        // August is clipped to today, not the month's end
        assert_eq!(
            series[7].end,
            day_end(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap())
        );
    }

    #[test]
    fn test_bucket_sums_equal_interval_sum() {
        let now = at(2026, 8, 5, 12, 0);
        let (start, end) = timeframe_interval(Timeframe::Weekly, now.date_naive());

        let sales = vec![
            // Exactly on the interval start boundary
            sale(Utc.from_utc_datetime(&start), 5.0),
            sale(at(2026, 8, 1, 0, 0), 10.0),
            sale(at(2026, 8, 3, 23, 59), 20.0),
            sale(at(2026, 8, 5, 12, 0), 40.0),
            // Outside
            sale(at(2026, 7, 1, 12, 0), 1000.0),
        ];

        let series = revenue_series(&sales, Timeframe::Weekly, &now);
        let bucket_sum: f64 = series.iter().map(|b| b.total_sales).sum();

        let interval_sum: f64 = sales
            .iter()
            .filter(|s| {
                let ts = s.sold_at.naive_utc();
                start <= ts && ts <= end
            })
            .map(|s| s.total_amount)
            .sum();

        assert_eq!(bucket_sum, interval_sum);
        assert_eq!(bucket_sum, 75.0);
    }

    #[test]
    fn test_top_products_ranked_by_profit_descending() {
        let now = at(2026, 8, 5, 12, 0);
        let sales = vec![
            sale_with_items(
                at(2026, 8, 4, 10, 0),
                vec![
                    // profit 3 * 3 = 9
                    item("mug", "Mug", 3.0, 5.0, 8.0),
                    // profit 2 * 10 = 20
                    item("grinder", "Grinder", 2.0, 20.0, 30.0),
                ],
            ),
            sale_with_items(
                at(2026, 8, 5, 10, 0),
                // profit 1 * 3 = 3, accumulating onto the mug
                vec![item("mug", "Mug", 1.0, 5.0, 8.0)],
            ),
        ];

        let ranking = top_products(&sales, &[], Timeframe::Weekly, &now);

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].product_id, "grinder");
        assert_eq!(ranking[0].profit, 20.0);
        assert_eq!(ranking[1].product_id, "mug");
        assert_eq!(ranking[1].profit, 12.0);
        assert_eq!(ranking[1].quantity_sold, 4.0);
    }

    #[test]
    fn test_top_products_excludes_sales_outside_interval() {
        let now = at(2026, 8, 5, 12, 0);
        let sales = vec![sale_with_items(
            at(2026, 6, 1, 10, 0),
            vec![item("mug", "Mug", 3.0, 5.0, 8.0)],
        )];

        let ranking = top_products(&sales, &[], Timeframe::Weekly, &now);
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_top_products_caps_at_limit() {
        let now = at(2026, 8, 5, 12, 0);
        let items: Vec<SaleItem> = (0..12)
            .map(|i| {
                item(
                    &format!("product-{i}"),
                    &format!("Product {i}"),
                    1.0,
                    1.0,
                    // Distinct profits so the cut is unambiguous
                    2.0 + f64::from(i),
                )
            })
            .collect();
        let sales = vec![sale_with_items(at(2026, 8, 4, 10, 0), items)];

        let ranking = top_products(&sales, &[], Timeframe::Weekly, &now);

        assert_eq!(ranking.len(), TOP_PRODUCT_LIMIT);
        assert_eq!(ranking[0].product_id, "product-11");
        assert_eq!(ranking[9].product_id, "product-2");
    }

    #[test]
    fn test_top_products_ties_keep_first_seen_order() {
        let now = at(2026, 8, 5, 12, 0);
        let sales = vec![sale_with_items(
            at(2026, 8, 4, 10, 0),
            vec![
                item("first", "First", 1.0, 5.0, 10.0),
                item("second", "Second", 1.0, 5.0, 10.0),
            ],
        )];

        let ranking = top_products(&sales, &[], Timeframe::Weekly, &now);

        assert_eq!(ranking[0].product_id, "first");
        assert_eq!(ranking[1].product_id, "second");
    }

    #[test]
    fn test_top_products_treats_non_finite_profit_as_zero() {
        let now = at(2026, 8, 5, 12, 0);
        let sales = vec![sale_with_items(
            at(2026, 8, 4, 10, 0),
            vec![
                item("broken", "Broken", 2.0, f64::NAN, 8.0),
                item("mug", "Mug", 1.0, 5.0, 8.0),
            ],
        )];

        let ranking = top_products(&sales, &[], Timeframe::Weekly, &now);

        assert_eq!(ranking[0].product_id, "mug");
        let broken = ranking.iter().find(|p| p.product_id == "broken").unwrap();
        assert_eq!(broken.profit, 0.0);
        assert_eq!(broken.quantity_sold, 2.0);
    }

    #[test]
    fn test_top_products_name_falls_back_to_live_product() {
        let now = at(2026, 8, 5, 12, 0);
        let live = Product {
            id: "mug".to_string(),
            name: "Live Mug".to_string(),
            product_type: ProductType::Unit,
            wholesale_price: 5.0,
            retail_price: 8.0,
            quantity: 10.0,
            last_modified: Utc::now(),
        };
        let sales = vec![sale_with_items(
            at(2026, 8, 4, 10, 0),
            vec![
                item("mug", "", 1.0, 5.0, 8.0),
                item("ghost", "", 1.0, 5.0, 8.0),
            ],
        )];

        let ranking = top_products(&sales, std::slice::from_ref(&live), Timeframe::Weekly, &now);

        let mug = ranking.iter().find(|p| p.product_id == "mug").unwrap();
        assert_eq!(mug.name, "Live Mug");
        // No snapshot, no live product: the raw id stands in
        let ghost = ranking.iter().find(|p| p.product_id == "ghost").unwrap();
        assert_eq!(ghost.name, "ghost");
    }

    #[test]
    fn test_deleted_product_still_ranks_through_snapshots() {
        let now = at(2026, 8, 5, 12, 0);
        // No live products at all; the snapshot carries everything needed
        let sales = vec![sale_with_items(
            at(2026, 8, 4, 10, 0),
            vec![item("gone", "Discontinued Mug", 2.0, 5.0, 8.0)],
        )];

        let ranking = top_products(&sales, &[], Timeframe::Weekly, &now);

        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].name, "Discontinued Mug");
        assert_eq!(ranking[0].profit, 6.0);
    }
}
