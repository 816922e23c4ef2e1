mod common;

tests!(arithmetic in lang is OK
    "3"
    "3.5000000000e0"
    "foobar"
    "2"
    "7"
    "5"
    "-1"
);

tests!(for_loop in lang is OK "0" "1" "2");

tests!(non_closing_functions in lang is OK "outer");

tests!(unbound_method in lang is OK "hi");

tests!(native_sleep in lang is OK "done");

tests!(print_formats in lang is OK
    "42"
    "3.5000000000e0"
    "true"
    "false"
    "nil"
    "hello"
);

tests!(function_without_return in lang is OK "1" "nil");
