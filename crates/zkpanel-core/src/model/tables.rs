// ── Device table definitions ──
//
// Field sets mirror the PULL SDK table layouts. Raw column names are the
// device's own, spelling quirks included.

use super::define_table;

define_table! {
    /// Card number information table.
    pub struct User {
        table: "user",
        keys: ["Pin"],
        fields: {
            card[CARD] => text("CardNo"),
            pin[PIN] => text("Pin"),
            password[PASSWORD] => text("Password"),
            group[GROUP] => text("Group"),
            start_time[START_TIME] => date("StartTime"),
            end_time[END_TIME] => date("EndTime"),
            super_authorize[SUPER_AUTHORIZE] => boolean("SuperAuthorize"),
        }
    }
}

define_table! {
    /// Access privilege list.
    pub struct UserAuthorize {
        table: "userauthorize",
        keys: ["Pin"],
        fields: {
            pin[PIN] => text("Pin"),
            timezone_id[TIMEZONE_ID] => int("AuthorizeTimezoneId"),
            /// Which of the four locks this privilege opens.
            doors[DOORS] => doors("AuthorizeDoorId"),
        }
    }
}

define_table! {
    /// Holidays table.
    pub struct Holiday {
        table: "holiday",
        keys: ["Holiday"],
        fields: {
            holiday[HOLIDAY] => text("Holiday"),
            holiday_type[HOLIDAY_TYPE] => int("HolidayType"),
            recurrence[RECURRENCE] => holiday_loop("Loop"),
        }
    }
}

define_table! {
    /// Time zone table: three daily segments for each weekday and the
    /// three holiday types.
    pub struct Timezone {
        table: "timezone",
        keys: ["TimezoneId"],
        fields: {
            timezone_id[TIMEZONE_ID] => text("TimezoneId"),
            // Segment 1
            sun_time1[SUN_TIME1] => time_range("SunTime1"),
            mon_time1[MON_TIME1] => time_range("MonTime1"),
            tue_time1[TUE_TIME1] => time_range("TueTime1"),
            wed_time1[WED_TIME1] => time_range("WedTime1"),
            thu_time1[THU_TIME1] => time_range("ThuTime1"),
            fri_time1[FRI_TIME1] => time_range("FriTime1"),
            sat_time1[SAT_TIME1] => time_range("SatTime1"),
            hol1_time1[HOL1_TIME1] => time_range("Hol1Time1"),
            hol2_time1[HOL2_TIME1] => time_range("Hol2Time1"),
            hol3_time1[HOL3_TIME1] => time_range("Hol3Time1"),
            // Segment 2
            sun_time2[SUN_TIME2] => time_range("SunTime2"),
            mon_time2[MON_TIME2] => time_range("MonTime2"),
            tue_time2[TUE_TIME2] => time_range("TueTime2"),
            wed_time2[WED_TIME2] => time_range("WedTime2"),
            thu_time2[THU_TIME2] => time_range("ThuTime2"),
            fri_time2[FRI_TIME2] => time_range("FriTime2"),
            sat_time2[SAT_TIME2] => time_range("SatTime2"),
            hol1_time2[HOL1_TIME2] => time_range("Hol1Time2"),
            hol2_time2[HOL2_TIME2] => time_range("Hol2Time2"),
            hol3_time2[HOL3_TIME2] => time_range("Hol3Time2"),
            // Segment 3
            sun_time3[SUN_TIME3] => time_range("SunTime3"),
            mon_time3[MON_TIME3] => time_range("MonTime3"),
            tue_time3[TUE_TIME3] => time_range("TueTime3"),
            wed_time3[WED_TIME3] => time_range("WedTime3"),
            thu_time3[THU_TIME3] => time_range("ThuTime3"),
            fri_time3[FRI_TIME3] => time_range("FriTime3"),
            sat_time3[SAT_TIME3] => time_range("SatTime3"),
            hol1_time3[HOL1_TIME3] => time_range("Hol1Time3"),
            hol2_time3[HOL2_TIME3] => time_range("Hol2Time3"),
            hol3_time3[HOL3_TIME3] => time_range("Hol3Time3"),
        }
    }
}

define_table! {
    /// Access control record table.
    pub struct Transaction {
        table: "transaction",
        keys: [],
        fields: {
            card[CARD] => text("Cardno"),
            pin[PIN] => text("Pin"),
            verify_mode[VERIFY_MODE] => verify_mode("Verified"),
            door[DOOR] => int("DoorID"),
            event_type[EVENT_TYPE] => event_code("EventType"),
            entry_exit[ENTRY_EXIT] => passage("InOutState"),
            time[TIME] => datetime("Time_second"),
        }
    }
}

define_table! {
    /// First-card door opening.
    pub struct FirstCard {
        table: "firstcard",
        keys: ["DoorID", "Pin"],
        fields: {
            door[DOOR] => int("DoorID"),
            pin[PIN] => text("Pin"),
            timezone_id[TIMEZONE_ID] => int("TimezoneID"),
        }
    }
}

define_table! {
    /// Multi-card door opening.
    pub struct MultiCard {
        // The device table name really is misspelled in firmware.
        table: "multimcard",
        keys: ["Index"],
        fields: {
            index[INDEX] => text("Index"),
            door[DOOR] => int("DoorId"),
            group1[GROUP1] => text("Group1"),
            group2[GROUP2] => text("Group2"),
            group3[GROUP3] => text("Group3"),
            group4[GROUP4] => text("Group4"),
            group5[GROUP5] => text("Group5"),
        }
    }
}

define_table! {
    /// Linkage control I/O table.
    pub struct InOutFun {
        table: "inoutfun",
        keys: ["Index"],
        fields: {
            index[INDEX] => text("Index"),
            event_type[EVENT_TYPE] => event_code("EventType"),
            input_index[INPUT_INDEX] => int("InAddr"),
            is_output[IS_OUTPUT] => relay_group("OutType"),
            output_index[OUTPUT_INDEX] => int("OutAddr"),
            time[TIME] => text("OutTime"),
            reserved[RESERVED] => text("Reserved"),
        }
    }
}

define_table! {
    /// Fingerprint template table.
    pub struct TemplateV10 {
        table: "templatev10",
        keys: ["Pin", "FingerID"],
        fields: {
            size[SIZE] => text("Size"),
            uid[UID] => text("UID"),
            pin[PIN] => text("Pin"),
            finger_id[FINGER_ID] => text("FingerID"),
            valid[VALID] => text("Valid"),
            template[TEMPLATE] => text("Template"),
            // Column name misspelled on the device.
            reserved[RESERVED] => text("Resverd"),
            end_tag[END_TAG] => text("EndTag"),
        }
    }
}
